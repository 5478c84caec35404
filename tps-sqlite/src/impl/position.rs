use crate::{
    Db,
    types::{PositionRow, collect},
};
use tps_core::{
    models::{PositionData, PositionId, PositionRecord, PositionStatus},
    ports::PositionRepository,
};
use tracing::{Level, event};

impl PositionRepository for Db {
    async fn create_position(&self, data: PositionData) -> Result<PositionRecord, Self::Error> {
        let row = sqlx::query_as::<_, PositionRow>(
            r#"
            insert into
                position (school_name, district, branch, quota, status)
            values
                ($1, $2, $3, $4, $5)
            returning
                id, school_name, district, branch, quota, status
            "#,
        )
        .bind(&data.school_name)
        .bind(&data.district)
        .bind(&data.branch)
        .bind(data.quota.get())
        .bind(PositionStatus::Active.as_str())
        .fetch_one(&self.writer)
        .await?;

        event!(Level::DEBUG, position_id = row.id, "created position");
        row.try_into()
    }

    async fn get_position(
        &self,
        position_id: PositionId,
    ) -> Result<Option<PositionRecord>, Self::Error> {
        sqlx::query_as::<_, PositionRow>(
            r#"
            select
                id, school_name, district, branch, quota, status
            from
                position
            where
                id = $1
            "#,
        )
        .bind(position_id.0)
        .fetch_optional(&self.reader)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    async fn set_position_status(
        &self,
        position_id: PositionId,
        status: PositionStatus,
    ) -> Result<Option<PositionRecord>, Self::Error> {
        let row = sqlx::query_as::<_, PositionRow>(
            r#"
            update
                position
            set
                status = $1
            where
                id = $2
            returning
                id, school_name, district, branch, quota, status
            "#,
        )
        .bind(status.as_str())
        .bind(position_id.0)
        .fetch_optional(&self.writer)
        .await?;

        if row.is_some() {
            event!(Level::DEBUG, %position_id, %status, "set position status");
        }
        row.map(TryInto::try_into).transpose()
    }

    async fn positions_for_branch(
        &self,
        branch: &str,
    ) -> Result<Vec<PositionRecord>, Self::Error> {
        let rows = sqlx::query_as::<_, PositionRow>(
            r#"
            select
                id, school_name, district, branch, quota, status
            from
                position
            where
                branch = $1
            and
                status = 'active'
            order by
                district, school_name, id
            "#,
        )
        .bind(branch)
        .fetch_all(&self.reader)
        .await?;

        collect(rows)
    }
}
