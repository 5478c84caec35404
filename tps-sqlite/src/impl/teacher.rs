use crate::{Db, types::TeacherRow};
use tps_core::{
    models::{TeacherId, TeacherRecord},
    ports::TeacherRepository,
};
use tracing::{Level, event};

impl TeacherRepository for Db {
    async fn upsert_teacher(&self, teacher: TeacherRecord) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            insert into
                teacher (id, first_name, last_name, branch, placement_points, current_assignment)
            values
                ($1, $2, $3, $4, $5, $6)
            on conflict (id) do update set
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                branch = excluded.branch,
                placement_points = excluded.placement_points,
                current_assignment = excluded.current_assignment
            "#,
        )
        .bind(teacher.id.as_str())
        .bind(&teacher.first_name)
        .bind(&teacher.last_name)
        .bind(&teacher.branch)
        .bind(teacher.placement_points.value())
        .bind(teacher.current_assignment.as_deref())
        .execute(&self.writer)
        .await?;

        event!(Level::DEBUG, teacher_id = %teacher.id, "upserted teacher");
        Ok(())
    }

    async fn get_teacher(
        &self,
        teacher_id: &TeacherId,
    ) -> Result<Option<TeacherRecord>, Self::Error> {
        sqlx::query_as::<_, TeacherRow>(
            r#"
            select
                id, first_name, last_name, branch, placement_points, current_assignment
            from
                teacher
            where
                id = $1
            "#,
        )
        .bind(teacher_id.as_str())
        .fetch_optional(&self.reader)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }
}
