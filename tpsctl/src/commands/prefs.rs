use crate::CliError;
use time::OffsetDateTime;
use tps_core::{
    models::{
        PeriodId, PeriodPreferenceRecord, PositionId, PositionRecord, PreferenceList,
        PreferenceRecord, PreferenceStats, TeacherId,
    },
    ports::{PlacementRepository, PreferenceFailure},
};

/// A teacher's list for a period, in rank order.
pub async fn show<R: PlacementRepository>(
    db: &R,
    teacher_id: &TeacherId,
    period_id: PeriodId,
) -> anyhow::Result<Vec<PreferenceRecord>> {
    Ok(db.get_for_teacher(teacher_id, period_id).await?)
}

/// Replace a teacher's list while the period accepts submissions.
///
/// Returns the stored list as it reads back after the replacement.
pub async fn set<R: PlacementRepository>(
    db: &R,
    teacher_id: &TeacherId,
    period_id: PeriodId,
    positions: Vec<PositionId>,
    as_of: OffsetDateTime,
) -> anyhow::Result<Vec<PreferenceRecord>> {
    let period = db
        .get_period(period_id, as_of)
        .await?
        .ok_or(CliError::PeriodNotFound(period_id))?;
    if !period.is_editable(as_of) {
        return Err(CliError::PeriodNotEditable {
            period_id,
            status: period.status,
        }
        .into());
    }

    let list = PreferenceList::from_ordered(positions)
        .map_err(|error| CliError::Preferences(PreferenceFailure::from(error)))?;
    db.replace_preferences(teacher_id, period_id, list)
        .await?
        .map_err(CliError::from)?;

    Ok(db.get_for_teacher(teacher_id, period_id).await?)
}

/// The active positions of the teacher's branch.
pub async fn positions<R: PlacementRepository>(
    db: &R,
    teacher_id: &TeacherId,
) -> anyhow::Result<Vec<PositionRecord>> {
    let teacher = db
        .get_teacher(teacher_id)
        .await?
        .ok_or_else(|| CliError::TeacherNotFound(teacher_id.clone()))?;
    Ok(db.positions_for_branch(&teacher.branch).await?)
}

/// Every preference submitted for a period.
pub async fn list<R: PlacementRepository>(
    db: &R,
    period_id: PeriodId,
) -> anyhow::Result<Vec<PeriodPreferenceRecord>> {
    Ok(db.get_all_for_period(period_id).await?)
}

/// Submission counts of a period.
pub async fn stats<R: PlacementRepository>(
    db: &R,
    period_id: PeriodId,
) -> anyhow::Result<PreferenceStats> {
    Ok(db.preference_stats(period_id).await?)
}
