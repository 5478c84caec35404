use crate::CliError;
use serde::Serialize;
use time::OffsetDateTime;
use tps_core::{
    models::{Period, PeriodId, PeriodStatus},
    ports::PlacementRepository,
};

/// A period together with what the clock currently allows.
#[derive(Debug, Serialize)]
pub struct PeriodView {
    /// The refreshed period
    #[serde(flatten)]
    pub period: Period,
    /// Whether preference lists may be edited
    pub editable: bool,
    /// Whether an assignment run may start
    pub ended: bool,
}

/// Look up a period, failing if it does not exist.
pub async fn show<R: PlacementRepository>(
    db: &R,
    period_id: PeriodId,
    as_of: OffsetDateTime,
) -> anyhow::Result<PeriodView> {
    let period = db
        .get_period(period_id, as_of)
        .await?
        .ok_or(CliError::PeriodNotFound(period_id))?;
    Ok(PeriodView {
        editable: period.is_editable(as_of),
        ended: period.has_ended(as_of),
        period,
    })
}

/// Overwrite a period's stored status.
pub async fn set_status<R: PlacementRepository>(
    db: &R,
    period_id: PeriodId,
    status: PeriodStatus,
) -> anyhow::Result<Period> {
    Ok(db
        .set_period_status(period_id, status)
        .await?
        .ok_or(CliError::PeriodNotFound(period_id))?)
}

/// How many stored statuses a refresh changed.
#[derive(Debug, Serialize)]
pub struct RefreshSummary {
    /// Periods whose status moved forward
    pub changed: u64,
}

/// Refresh every stored period status.
pub async fn refresh<R: PlacementRepository>(
    db: &R,
    as_of: OffsetDateTime,
) -> anyhow::Result<RefreshSummary> {
    let changed = db.refresh_period_statuses(as_of).await?;
    Ok(RefreshSummary { changed })
}

/// The period accepting preferences, if any.
pub async fn active<R: PlacementRepository>(
    db: &R,
    as_of: OffsetDateTime,
) -> anyhow::Result<Option<Period>> {
    Ok(db.active_period(as_of).await?)
}
