use crate::models::{Period, PeriodData, PeriodId, PeriodStatus};
use time::OffsetDateTime;

/// Repository interface for preference periods.
///
/// The stored status of a period is a cache of what [`classify`] says about
/// its window. Reads refresh it forward-only, so an administrative override
/// to `completed` is never undone by the clock.
///
/// [`classify`]: crate::models::classify
pub trait PeriodRepository: super::Repository {
    /// Create a period whose cached status is classified at `as_of`.
    fn create_period(
        &self,
        window: PeriodData,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Period, Self::Error>> + Send;

    /// Get a period with its status refreshed as of `as_of`, or None.
    fn get_period(
        &self,
        period_id: PeriodId,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Option<Period>, Self::Error>> + Send;

    /// Overwrite the cached status of a period.
    ///
    /// # Returns
    ///
    /// - Ok(Some(period)) with the stored period
    /// - Ok(None) if no such period exists
    fn set_period_status(
        &self,
        period_id: PeriodId,
        status: PeriodStatus,
    ) -> impl Future<Output = Result<Option<Period>, Self::Error>> + Send;

    /// Persist the refreshed status of every period.
    ///
    /// # Returns
    ///
    /// The number of periods whose stored status changed.
    fn refresh_period_statuses(
        &self,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;

    /// The most recently opened period whose refreshed status is active.
    fn active_period(
        &self,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Option<Period>, Self::Error>> + Send;
}
