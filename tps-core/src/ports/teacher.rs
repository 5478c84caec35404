use crate::models::{TeacherId, TeacherRecord};

/// Repository interface for the teacher roster.
pub trait TeacherRepository: super::Repository {
    /// Insert a teacher, or overwrite every field of an existing one.
    fn upsert_teacher(
        &self,
        teacher: TeacherRecord,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Get a teacher by national ID, or None if unknown.
    fn get_teacher(
        &self,
        teacher_id: &TeacherId,
    ) -> impl Future<Output = Result<Option<TeacherRecord>, Self::Error>> + Send;
}
