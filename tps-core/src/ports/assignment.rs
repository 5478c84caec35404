use crate::models::{AssignmentRecord, AssignmentReport, PeriodId, RunRecord, RunSummary};
use time::OffsetDateTime;

/// Reasons an assignment run is refused or aborted.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RunFailure<E> {
    /// The period does not exist
    #[error("period {0} does not exist")]
    PeriodNotFound(PeriodId),
    /// The period's window has not closed yet
    #[error("period has not ended; it closes at {end}")]
    PeriodNotEnded {
        /// Closing instant of the period
        end: OffsetDateTime,
    },
    /// The allocator failed; nothing was written
    #[error("allocation failed: {0}")]
    Allocator(E),
}

/// Repository interface for running and inspecting assignments.
pub trait AssignmentRepository: super::Repository {
    /// Execute an assignment run for a period.
    ///
    /// Gather every teacher with at least one preference for the period and
    /// the capacity of every active position, hand them to `allocator`, and
    /// write one assignment row per teacher, all in one transaction.
    ///
    /// # Returns
    ///
    /// - Ok(Ok(summary)) if the run committed
    /// - Ok(Err(failure)) if the run was refused or the allocator failed
    /// - Err(repository_error) if there is some other error
    fn run_assignment<A: super::Allocator + Sync>(
        &self,
        period_id: PeriodId,
        as_of: OffsetDateTime,
        allocator: &A,
    ) -> impl Future<Output = Result<Result<RunSummary, RunFailure<A::Error>>, Self::Error>> + Send;

    /// Every assignment row of the period: assigned first, then by score
    /// descending.
    fn get_assignments(
        &self,
        period_id: PeriodId,
    ) -> impl Future<Output = Result<Vec<AssignmentRecord>, Self::Error>> + Send;

    /// Assigned and unassigned lists plus per-position fill figures.
    fn assignment_report(
        &self,
        period_id: PeriodId,
    ) -> impl Future<Output = Result<AssignmentReport, Self::Error>> + Send;

    /// The runs of a period, newest first.
    fn run_history(
        &self,
        period_id: PeriodId,
    ) -> impl Future<Output = Result<Vec<RunRecord>, Self::Error>> + Send;
}
