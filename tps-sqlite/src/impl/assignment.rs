use crate::{
    Db,
    types::{
        ApplicantRow, AssignedRowRow, AssignmentRow, BaselineRow, DateTime, PeriodRow,
        PositionFillRow, RunRow, UnassignedRowRow, collect, points, rank, teacher_id,
    },
};
use time::OffsetDateTime;
use tokio::try_join;
use tps_core::{
    models::{
        Applicant, AssignmentRecord, AssignmentReport, CapacityLedger, Map, Period, PeriodId,
        PositionBaseline, PositionId, PreferenceEntry, PreferenceList, RunId, RunRecord, RunSummary,
    },
    ports::{Allocator, AssignmentRepository, RunFailure},
};
use tracing::{Instrument as _, Level, event, span};

// Each assignment row binds 8 parameters; stay well inside SQLite's limit.
const UPSERT_CHUNK: usize = 1000;

impl AssignmentRepository for Db {
    async fn run_assignment<A: Allocator + Sync>(
        &self,
        period_id: PeriodId,
        as_of: OffsetDateTime,
        allocator: &A,
    ) -> Result<Result<RunSummary, RunFailure<A::Error>>, Self::Error> {
        let span = span!(Level::INFO, "assignment run", %period_id);
        self.execute_run(period_id, as_of, allocator)
            .instrument(span)
            .await
    }

    async fn get_assignments(
        &self,
        period_id: PeriodId,
    ) -> Result<Vec<AssignmentRecord>, Self::Error> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            select
                teacher_id, period_id, position_id, rank, status,
                placement_points, assigned_at, run_id
            from
                assignment
            where
                period_id = $1
            order by
                status = 'assigned' desc, placement_points desc, teacher_id
            "#,
        )
        .bind(period_id.0)
        .fetch_all(&self.reader)
        .await?;

        collect(rows)
    }

    async fn assignment_report(&self, period_id: PeriodId) -> Result<AssignmentReport, Self::Error> {
        let assigned = sqlx::query_as::<_, AssignedRowRow>(
            r#"
            select
                a.teacher_id, t.first_name, t.last_name, t.branch, a.placement_points,
                a.position_id, pos.school_name, pos.district, a.rank, a.assigned_at
            from
                assignment a
            join
                teacher t on t.id = a.teacher_id
            join
                position pos on pos.id = a.position_id
            where
                a.period_id = $1
            and
                a.status = 'assigned'
            order by
                a.placement_points desc, a.teacher_id
            "#,
        )
        .bind(period_id.0)
        .fetch_all(&self.reader);

        let unassigned = sqlx::query_as::<_, UnassignedRowRow>(
            r#"
            select
                a.teacher_id, t.first_name, t.last_name, t.branch, a.placement_points,
                t.current_assignment
            from
                assignment a
            join
                teacher t on t.id = a.teacher_id
            where
                a.period_id = $1
            and
                a.status = 'unassigned'
            order by
                a.placement_points desc, a.teacher_id
            "#,
        )
        .bind(period_id.0)
        .fetch_all(&self.reader);

        let positions = sqlx::query_as::<_, PositionFillRow>(
            r#"
            select
                pos.id as position_id,
                pos.school_name,
                pos.district,
                pos.branch,
                pos.quota,
                (
                    select
                        count(*)
                    from
                        assignment a
                    where
                        a.position_id = pos.id
                    and
                        a.period_id = $1
                    and
                        a.status = 'assigned'
                ) as filled_count
            from
                position pos
            where
                pos.status = 'active'
            order by
                pos.school_name, pos.id
            "#,
        )
        .bind(period_id.0)
        .fetch_all(&self.reader);

        let (assigned, unassigned, positions) = try_join!(assigned, unassigned, positions)?;

        Ok(AssignmentReport::new(
            collect(assigned)?,
            collect(unassigned)?,
            collect(positions)?,
        ))
    }

    async fn run_history(&self, period_id: PeriodId) -> Result<Vec<RunRecord>, Self::Error> {
        let rows = sqlx::query_as::<_, RunRow>(
            r#"
            select
                id, period_id, started_at, assigned_count, unassigned_count, total_teachers
            from
                assignment_run
            where
                period_id = $1
            order by
                id desc
            "#,
        )
        .bind(period_id.0)
        .fetch_all(&self.reader)
        .await?;

        collect(rows)
    }
}

impl Db {
    async fn execute_run<A: Allocator>(
        &self,
        period_id: PeriodId,
        as_of: OffsetDateTime,
        allocator: &A,
    ) -> Result<Result<RunSummary, RunFailure<A::Error>>, sqlx::Error> {
        let mut tx = self.writer.begin().await?;

        let period: Option<Period> = sqlx::query_as::<_, PeriodRow>(
            "select id, start_at, end_at, status from preference_period where id = $1",
        )
        .bind(period_id.0)
        .fetch_optional(&mut *tx)
        .await?
        .map(TryInto::try_into)
        .transpose()?;

        let Some(period) = period else {
            return Ok(Err(RunFailure::PeriodNotFound(period_id)));
        };
        if !period.has_ended(as_of) {
            return Ok(Err(RunFailure::PeriodNotEnded {
                end: period.window.end(),
            }));
        }

        // The run's first write. From here until commit this transaction
        // holds the database's write lock, so the inputs read below cannot
        // be changed by another run before our results land.
        let started_at = DateTime::from(as_of);
        let run_id = RunId(
            sqlx::query_scalar::<_, i64>(
                "insert into assignment_run (period_id, started_at) values ($1, $2) returning id",
            )
            .bind(period_id.0)
            .bind(started_at)
            .fetch_one(&mut *tx)
            .await?,
        );

        // Every teacher with at least one preference, with their list
        let rows = sqlx::query_as::<_, ApplicantRow>(
            r#"
            select
                pref.teacher_id, t.branch, t.placement_points, pref.position_id, pref.rank
            from
                preference pref
            join
                teacher t on t.id = pref.teacher_id
            where
                pref.period_id = $1
            order by
                pref.teacher_id, pref.rank
            "#,
        )
        .bind(period_id.0)
        .fetch_all(&mut *tx)
        .await?;
        let applicants = group_applicants(rows)?;

        if applicants.is_empty() {
            // Nothing to decide, so nothing is recorded either; dropping
            // the transaction discards the run row.
            event!(Level::INFO, "no preferences submitted");
            return Ok(Ok(RunSummary::default()));
        }

        // Seats held by teachers outside this roster count against the
        // quota; rows of teachers in the roster are about to be rewritten.
        let baseline = sqlx::query_as::<_, BaselineRow>(
            r#"
            select
                pos.id,
                pos.branch,
                pos.quota,
                (
                    select
                        count(*)
                    from
                        assignment a
                    where
                        a.position_id = pos.id
                    and
                        a.period_id = $1
                    and
                        a.status = 'assigned'
                    and
                        not exists (
                            select 1 from preference pref
                            where pref.teacher_id = a.teacher_id and pref.period_id = $1
                        )
                ) as occupied
            from
                position pos
            where
                pos.status = 'active'
            order by
                pos.id
            "#,
        )
        .bind(period_id.0)
        .fetch_all(&mut *tx)
        .await?;
        let ledger = CapacityLedger::from_baseline(
            collect::<_, PositionBaseline>(baseline)?,
        );

        event!(
            Level::DEBUG,
            applicants = applicants.len(),
            positions = ledger.len(),
            free_seats = ledger.free_seats(),
            "loaded run inputs"
        );

        let allocation = match allocator.allocate(applicants, ledger) {
            Ok(allocation) => allocation,
            Err(error) => {
                event!(Level::WARN, %error, "allocation failed; rolling back");
                return Ok(Err(RunFailure::Allocator(error)));
            }
        };

        let decisions: Vec<_> = allocation.decisions.iter().collect();
        for chunk in decisions.chunks(UPSERT_CHUNK) {
            let mut query = sqlx::QueryBuilder::new(
                "insert into assignment (teacher_id, period_id, position_id, rank, status, placement_points, assigned_at, run_id) ",
            );
            query.push_values(chunk, |mut row, (teacher_id, decision)| {
                let outcome = decision.outcome;
                let assigned_at = outcome.position_id().map(|_| started_at);
                row.push_bind(teacher_id.as_str())
                    .push_bind(period_id.0)
                    .push_bind(outcome.position_id().map(|id| id.0))
                    .push_bind(outcome.rank().map(|rank| rank.get()))
                    .push_bind(outcome.status().as_str())
                    .push_bind(decision.placement_points.value())
                    .push_bind(assigned_at)
                    .push_bind(run_id.0);
            });
            query.push(
                r#"
                on conflict (teacher_id, period_id) do update set
                    position_id = excluded.position_id,
                    rank = excluded.rank,
                    status = excluded.status,
                    placement_points = excluded.placement_points,
                    assigned_at = excluded.assigned_at,
                    run_id = excluded.run_id
                "#,
            );
            query.build().execute(&mut *tx).await?;
        }

        let summary = allocation.summary();
        sqlx::query(
            r#"
            update
                assignment_run
            set
                assigned_count = $1,
                unassigned_count = $2,
                total_teachers = $3
            where
                id = $4
            "#,
        )
        .bind(summary.assigned_count as i64)
        .bind(summary.unassigned_count as i64)
        .bind(summary.total_teachers as i64)
        .bind(run_id.0)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        event!(
            Level::INFO,
            %run_id,
            assigned = summary.assigned_count,
            unassigned = summary.unassigned_count,
            total = summary.total_teachers,
            "assignment run committed"
        );
        Ok(Ok(summary))
    }
}

/// Fold preference rows, sorted by teacher then rank, into applicants.
fn group_applicants(rows: Vec<ApplicantRow>) -> Result<Vec<Applicant>, sqlx::Error> {
    let mut grouped: Map<String, (String, f64, Vec<PreferenceEntry>)> = Map::default();
    for row in rows {
        let entry = PreferenceEntry {
            position_id: PositionId(row.position_id),
            rank: rank(row.rank)?,
        };
        grouped
            .entry(row.teacher_id)
            .or_insert_with(|| (row.branch, row.placement_points, Vec::new()))
            .2
            .push(entry);
    }

    grouped
        .into_iter()
        .map(|(id, (branch, placement_points, entries))| {
            Ok(Applicant {
                teacher_id: teacher_id(id)?,
                branch,
                placement_points: points(placement_points)?,
                preferences: PreferenceList::from_stored(entries),
            })
        })
        .collect()
}
