use crate::{
    Db,
    types::{DateTime, PeriodRow},
};
use time::OffsetDateTime;
use tps_core::{
    models::{Period, PeriodData, PeriodId, PeriodStatus, classify},
    ports::PeriodRepository,
};
use tracing::{Level, event};

impl PeriodRepository for Db {
    async fn create_period(
        &self,
        window: PeriodData,
        as_of: OffsetDateTime,
    ) -> Result<Period, Self::Error> {
        let status = classify(window.start(), window.end(), as_of);
        let row = sqlx::query_as::<_, PeriodRow>(
            r#"
            insert into
                preference_period (start_at, end_at, status)
            values
                ($1, $2, $3)
            returning
                id, start_at, end_at, status
            "#,
        )
        .bind(DateTime::from(window.start()))
        .bind(DateTime::from(window.end()))
        .bind(status.as_str())
        .fetch_one(&self.writer)
        .await?;

        event!(Level::DEBUG, period_id = row.id, %status, "created period");
        row.try_into()
    }

    async fn get_period(
        &self,
        period_id: PeriodId,
        as_of: OffsetDateTime,
    ) -> Result<Option<Period>, Self::Error> {
        let period: Option<Period> = sqlx::query_as::<_, PeriodRow>(
            r#"
            select
                id, start_at, end_at, status
            from
                preference_period
            where
                id = $1
            "#,
        )
        .bind(period_id.0)
        .fetch_optional(&self.reader)
        .await?
        .map(TryInto::try_into)
        .transpose()?;

        Ok(period.map(|period| period.refreshed(as_of)))
    }

    async fn set_period_status(
        &self,
        period_id: PeriodId,
        status: PeriodStatus,
    ) -> Result<Option<Period>, Self::Error> {
        let row = sqlx::query_as::<_, PeriodRow>(
            r#"
            update
                preference_period
            set
                status = $1
            where
                id = $2
            returning
                id, start_at, end_at, status
            "#,
        )
        .bind(status.as_str())
        .bind(period_id.0)
        .fetch_optional(&self.writer)
        .await?;

        if row.is_some() {
            event!(Level::DEBUG, %period_id, %status, "set period status");
        }
        row.map(TryInto::try_into).transpose()
    }

    async fn refresh_period_statuses(&self, as_of: OffsetDateTime) -> Result<u64, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let rows = sqlx::query_as::<_, PeriodRow>(
            r#"
            select
                id, start_at, end_at, status
            from
                preference_period
            where
                status != 'completed'
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut changed = 0;
        for row in rows {
            let period = Period::try_from(row)?;
            let refreshed = period.refreshed(as_of);
            if refreshed.status == period.status {
                continue;
            }
            sqlx::query("update preference_period set status = $1 where id = $2")
                .bind(refreshed.status.as_str())
                .bind(period.id.0)
                .execute(&mut *tx)
                .await?;
            event!(
                Level::DEBUG,
                period_id = %period.id,
                from = %period.status,
                to = %refreshed.status,
                "refreshed period status"
            );
            changed += 1;
        }

        tx.commit().await?;
        Ok(changed)
    }

    async fn active_period(&self, as_of: OffsetDateTime) -> Result<Option<Period>, Self::Error> {
        let now = DateTime::from(as_of);
        let rows = sqlx::query_as::<_, PeriodRow>(
            r#"
            select
                id, start_at, end_at, status
            from
                preference_period
            where
                start_at <= $1
            and
                end_at > $1
            order by
                start_at desc, id desc
            "#,
        )
        .bind(now)
        .fetch_all(&self.reader)
        .await?;

        for row in rows {
            let period = Period::try_from(row)?.refreshed(as_of);
            if period.status == PeriodStatus::Active {
                return Ok(Some(period));
            }
        }
        Ok(None)
    }
}
