use crate::models::{
    PeriodId, PeriodPreferenceRecord, PositionId, PreferenceList, PreferenceListError,
    PreferenceRecord, PreferenceStats, TeacherId,
};

/// Reasons a preference list is refused before anything is written.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PreferenceFailure {
    /// The teacher is not on the roster
    #[error("teacher {0} does not exist")]
    TeacherNotFound(TeacherId),
    /// The period does not exist
    #[error("period {0} does not exist")]
    PeriodNotFound(PeriodId),
    /// A listed position does not exist
    #[error("position {0} does not exist")]
    PositionNotFound(PositionId),
    /// A listed position is not active
    #[error("position {0} is not active")]
    PositionInactive(PositionId),
    /// A listed position belongs to another branch
    #[error("position {position_id} is for branch {position_branch}, not {teacher_branch}")]
    BranchMismatch {
        /// The offending position
        position_id: PositionId,
        /// Branch of the position
        position_branch: String,
        /// Branch of the teacher
        teacher_branch: String,
    },
    /// The list itself is malformed
    #[error(transparent)]
    Invalid(#[from] PreferenceListError),
}

/// Repository interface for the preference store.
///
/// Lists are always replaced whole. Whether the period is currently
/// editable is the caller's concern; the store only checks that the list
/// refers to existing, active positions of the teacher's branch.
pub trait PreferenceRepository: super::Repository {
    /// Atomically replace the teacher's list for the period.
    ///
    /// An empty list withdraws the teacher from the period. Either the whole
    /// new list becomes visible or, on any failure, the old one remains.
    fn replace_preferences(
        &self,
        teacher_id: &TeacherId,
        period_id: PeriodId,
        preferences: PreferenceList,
    ) -> impl Future<Output = Result<Result<(), PreferenceFailure>, Self::Error>> + Send;

    /// The teacher's list joined with position display data, in rank order.
    fn get_for_teacher(
        &self,
        teacher_id: &TeacherId,
        period_id: PeriodId,
    ) -> impl Future<Output = Result<Vec<PreferenceRecord>, Self::Error>> + Send;

    /// Every preference of the period, ordered by score descending, then last
    /// name, first name and rank.
    fn get_all_for_period(
        &self,
        period_id: PeriodId,
    ) -> impl Future<Output = Result<Vec<PeriodPreferenceRecord>, Self::Error>> + Send;

    /// Number of teachers with at least one preference in the period.
    fn count_distinct_teachers(
        &self,
        period_id: PeriodId,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;

    /// Number of preference rows in the period.
    fn count_total(
        &self,
        period_id: PeriodId,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;

    /// Both counts plus the mean list length.
    fn preference_stats(
        &self,
        period_id: PeriodId,
    ) -> impl Future<Output = Result<PreferenceStats, Self::Error>> + Send;
}
