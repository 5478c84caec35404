use crate::{
    Db,
    types::{PeriodPreferenceRow, PositionGateRow, PreferenceRow, collect},
};
use std::collections::HashMap;
use tokio::try_join;
use tps_core::{
    models::{
        PeriodId, PeriodPreferenceRecord, PositionStatus, PreferenceList,
        PreferenceRecord, PreferenceStats, TeacherId,
    },
    ports::{PreferenceFailure, PreferenceRepository},
};
use tracing::{Level, event};

impl PreferenceRepository for Db {
    async fn replace_preferences(
        &self,
        teacher_id: &TeacherId,
        period_id: PeriodId,
        preferences: PreferenceList,
    ) -> Result<Result<(), PreferenceFailure>, Self::Error> {
        // Validation reads and the replacement share one transaction, so the
        // positions cannot change between being checked and being referenced.
        let mut tx = self.writer.begin().await?;

        let Some(teacher_branch) =
            sqlx::query_scalar::<_, String>("select branch from teacher where id = $1")
                .bind(teacher_id.as_str())
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Ok(Err(PreferenceFailure::TeacherNotFound(teacher_id.clone())));
        };

        let period_exists =
            sqlx::query_scalar::<_, i64>("select count(*) from preference_period where id = $1")
                .bind(period_id.0)
                .fetch_one(&mut *tx)
                .await?
                > 0;
        if !period_exists {
            return Ok(Err(PreferenceFailure::PeriodNotFound(period_id)));
        }

        if !preferences.is_empty() {
            let mut query =
                sqlx::QueryBuilder::new("select id, branch, status from position where id in (");
            let mut separated = query.separated(", ");
            for entry in preferences.iter() {
                separated.push_bind(entry.position_id.0);
            }
            separated.push_unseparated(")");

            let gates: HashMap<i64, PositionGateRow> = query
                .build_query_as::<PositionGateRow>()
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .map(|row| (row.id, row))
                .collect();

            for entry in preferences.iter() {
                let position_id = entry.position_id;
                let Some(gate) = gates.get(&position_id.0) else {
                    return Ok(Err(PreferenceFailure::PositionNotFound(position_id)));
                };
                if gate.branch != teacher_branch {
                    return Ok(Err(PreferenceFailure::BranchMismatch {
                        position_id,
                        position_branch: gate.branch.clone(),
                        teacher_branch,
                    }));
                }
                if gate.status != PositionStatus::Active.as_str() {
                    return Ok(Err(PreferenceFailure::PositionInactive(position_id)));
                }
            }
        }

        sqlx::query("delete from preference where teacher_id = $1 and period_id = $2")
            .bind(teacher_id.as_str())
            .bind(period_id.0)
            .execute(&mut *tx)
            .await?;

        if !preferences.is_empty() {
            let mut query = sqlx::QueryBuilder::new(
                "insert into preference (teacher_id, period_id, position_id, rank) ",
            );
            query.push_values(preferences.iter(), |mut row, entry| {
                row.push_bind(teacher_id.as_str())
                    .push_bind(period_id.0)
                    .push_bind(entry.position_id.0)
                    .push_bind(entry.rank.get());
            });
            query.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        event!(
            Level::DEBUG,
            %teacher_id,
            %period_id,
            count = preferences.len(),
            "replaced preferences"
        );
        Ok(Ok(()))
    }

    async fn get_for_teacher(
        &self,
        teacher_id: &TeacherId,
        period_id: PeriodId,
    ) -> Result<Vec<PreferenceRecord>, Self::Error> {
        let rows = sqlx::query_as::<_, PreferenceRow>(
            r#"
            select
                pref.rank, pref.position_id, pos.school_name, pos.district, pos.branch
            from
                preference pref
            join
                position pos on pos.id = pref.position_id
            where
                pref.teacher_id = $1
            and
                pref.period_id = $2
            order by
                pref.rank
            "#,
        )
        .bind(teacher_id.as_str())
        .bind(period_id.0)
        .fetch_all(&self.reader)
        .await?;

        collect(rows)
    }

    async fn get_all_for_period(
        &self,
        period_id: PeriodId,
    ) -> Result<Vec<PeriodPreferenceRecord>, Self::Error> {
        let rows = sqlx::query_as::<_, PeriodPreferenceRow>(
            r#"
            select
                pref.teacher_id, t.first_name, t.last_name, t.placement_points,
                pref.rank, pref.position_id, pos.school_name, pos.district
            from
                preference pref
            join
                teacher t on t.id = pref.teacher_id
            join
                position pos on pos.id = pref.position_id
            where
                pref.period_id = $1
            order by
                t.placement_points desc, t.last_name, t.first_name, pref.teacher_id, pref.rank
            "#,
        )
        .bind(period_id.0)
        .fetch_all(&self.reader)
        .await?;

        collect(rows)
    }

    async fn count_distinct_teachers(&self, period_id: PeriodId) -> Result<u64, Self::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "select count(distinct teacher_id) from preference where period_id = $1",
        )
        .bind(period_id.0)
        .fetch_one(&self.reader)
        .await?;
        Ok(count.unsigned_abs())
    }

    async fn count_total(&self, period_id: PeriodId) -> Result<u64, Self::Error> {
        let count =
            sqlx::query_scalar::<_, i64>("select count(*) from preference where period_id = $1")
                .bind(period_id.0)
                .fetch_one(&self.reader)
                .await?;
        Ok(count.unsigned_abs())
    }

    async fn preference_stats(&self, period_id: PeriodId) -> Result<PreferenceStats, Self::Error> {
        let (teachers_with_preferences, total_preferences) = try_join!(
            self.count_distinct_teachers(period_id),
            self.count_total(period_id)
        )?;

        let avg_preferences_per_teacher = (teachers_with_preferences > 0)
            .then(|| total_preferences as f64 / teachers_with_preferences as f64);

        Ok(PreferenceStats {
            teachers_with_preferences,
            total_preferences,
            avg_preferences_per_teacher,
        })
    }
}

