use crate::models::{PositionData, PositionId, PositionRecord, PositionStatus};

/// Repository interface for positions offered by schools.
pub trait PositionRepository: super::Repository {
    /// Create a new, active position.
    fn create_position(
        &self,
        data: PositionData,
    ) -> impl Future<Output = Result<PositionRecord, Self::Error>> + Send;

    /// Get a position by ID, or None if it does not exist.
    fn get_position(
        &self,
        position_id: PositionId,
    ) -> impl Future<Output = Result<Option<PositionRecord>, Self::Error>> + Send;

    /// Activate or deactivate a position.
    ///
    /// Deactivating a position does not touch preferences or assignments that
    /// reference it; the next run will simply not offer it.
    ///
    /// # Returns
    ///
    /// - Ok(Some(record)) with the updated position
    /// - Ok(None) if no such position exists
    fn set_position_status(
        &self,
        position_id: PositionId,
        status: PositionStatus,
    ) -> impl Future<Output = Result<Option<PositionRecord>, Self::Error>> + Send;

    /// List the active positions of `branch`, ordered by district then school.
    fn positions_for_branch(
        &self,
        branch: &str,
    ) -> impl Future<Output = Result<Vec<PositionRecord>, Self::Error>> + Send;
}
