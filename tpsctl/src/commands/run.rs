use crate::CliError;
use time::OffsetDateTime;
use tps_core::{
    models::{AssignmentRecord, AssignmentReport, PeriodId, RunRecord, RunSummary},
    ports::PlacementRepository,
};
use tps_solver::SerialDictatorship;

/// Run serial dictatorship over an ended period.
pub async fn run<R: PlacementRepository>(
    db: &R,
    period_id: PeriodId,
    as_of: OffsetDateTime,
) -> anyhow::Result<RunSummary> {
    Ok(db
        .run_assignment(period_id, as_of, &SerialDictatorship)
        .await?
        .map_err(CliError::from)?)
}

async fn require_period<R: PlacementRepository>(
    db: &R,
    period_id: PeriodId,
    as_of: OffsetDateTime,
) -> anyhow::Result<()> {
    match db.get_period(period_id, as_of).await? {
        Some(_) => Ok(()),
        None => Err(CliError::PeriodNotFound(period_id).into()),
    }
}

/// The stored assignment rows of a period.
pub async fn assignments<R: PlacementRepository>(
    db: &R,
    period_id: PeriodId,
    as_of: OffsetDateTime,
) -> anyhow::Result<Vec<AssignmentRecord>> {
    require_period(db, period_id, as_of).await?;
    Ok(db.get_assignments(period_id).await?)
}

/// The outcome of the latest run of a period.
pub async fn report<R: PlacementRepository>(
    db: &R,
    period_id: PeriodId,
    as_of: OffsetDateTime,
) -> anyhow::Result<AssignmentReport> {
    require_period(db, period_id, as_of).await?;
    Ok(db.assignment_report(period_id).await?)
}

/// The runs of a period, newest first.
pub async fn history<R: PlacementRepository>(
    db: &R,
    period_id: PeriodId,
    as_of: OffsetDateTime,
) -> anyhow::Result<Vec<RunRecord>> {
    require_period(db, period_id, as_of).await?;
    Ok(db.run_history(period_id).await?)
}
