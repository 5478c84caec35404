use super::DateTime;
use std::num::NonZeroU32;
use tps_core::models::{
    AssignedRow, AssignmentRecord, AssignmentStatus, Outcome, Period, PeriodData, PeriodId,
    PeriodPreferenceRecord, Points, PositionBaseline, PositionData, PositionFill, PositionId,
    PositionRecord, PreferenceRecord, Rank, RunId, RunRecord, RunSummary, TeacherId,
    TeacherRecord, UnassignedRow,
};

fn decode<E: std::error::Error + Send + Sync + 'static>(error: E) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(error))
}

pub(crate) fn teacher_id(value: String) -> Result<TeacherId, sqlx::Error> {
    TeacherId::new(value).map_err(decode)
}

pub(crate) fn points(value: f64) -> Result<Points, sqlx::Error> {
    Points::new(value).map_err(decode)
}

pub(crate) fn rank(value: i64) -> Result<Rank, sqlx::Error> {
    let value = u32::try_from(value).map_err(decode)?;
    Rank::new(value).map_err(decode)
}

pub(crate) fn count(value: i64) -> Result<u32, sqlx::Error> {
    u32::try_from(value).map_err(decode)
}

#[derive(sqlx::FromRow)]
pub(crate) struct TeacherRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub branch: String,
    pub placement_points: f64,
    pub current_assignment: Option<String>,
}

impl TryFrom<TeacherRow> for TeacherRecord {
    type Error = sqlx::Error;

    fn try_from(row: TeacherRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: teacher_id(row.id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            branch: row.branch,
            placement_points: points(row.placement_points)?,
            current_assignment: row.current_assignment,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PositionRow {
    pub id: i64,
    pub school_name: String,
    pub district: String,
    pub branch: String,
    pub quota: i64,
    pub status: String,
}

impl TryFrom<PositionRow> for PositionRecord {
    type Error = sqlx::Error;

    fn try_from(row: PositionRow) -> Result<Self, Self::Error> {
        let quota = NonZeroU32::new(count(row.quota)?)
            .ok_or_else(|| sqlx::Error::Decode("position quota must be positive".into()))?;
        Ok(Self {
            id: PositionId(row.id),
            data: PositionData {
                school_name: row.school_name,
                district: row.district,
                branch: row.branch,
                quota,
            },
            status: row.status.parse().map_err(decode)?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PeriodRow {
    pub id: i64,
    pub start_at: DateTime,
    pub end_at: DateTime,
    pub status: String,
}

impl TryFrom<PeriodRow> for Period {
    type Error = sqlx::Error;

    fn try_from(row: PeriodRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PeriodId(row.id),
            window: PeriodData::new(row.start_at.into(), row.end_at.into()).map_err(decode)?,
            status: row.status.parse().map_err(decode)?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PreferenceRow {
    pub rank: i64,
    pub position_id: i64,
    pub school_name: String,
    pub district: String,
    pub branch: String,
}

impl TryFrom<PreferenceRow> for PreferenceRecord {
    type Error = sqlx::Error;

    fn try_from(row: PreferenceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            rank: rank(row.rank)?,
            position_id: PositionId(row.position_id),
            school_name: row.school_name,
            district: row.district,
            branch: row.branch,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PeriodPreferenceRow {
    pub teacher_id: String,
    pub first_name: String,
    pub last_name: String,
    pub placement_points: f64,
    pub rank: i64,
    pub position_id: i64,
    pub school_name: String,
    pub district: String,
}

impl TryFrom<PeriodPreferenceRow> for PeriodPreferenceRecord {
    type Error = sqlx::Error;

    fn try_from(row: PeriodPreferenceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            teacher_id: teacher_id(row.teacher_id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            placement_points: points(row.placement_points)?,
            rank: rank(row.rank)?,
            position_id: PositionId(row.position_id),
            school_name: row.school_name,
            district: row.district,
        })
    }
}

/// Identity and gating data of a listed position, used to validate a list
#[derive(sqlx::FromRow)]
pub(crate) struct PositionGateRow {
    pub id: i64,
    pub branch: String,
    pub status: String,
}

/// One preference of one applicant, joined with the applicant's data
#[derive(sqlx::FromRow)]
pub(crate) struct ApplicantRow {
    pub teacher_id: String,
    pub branch: String,
    pub placement_points: f64,
    pub position_id: i64,
    pub rank: i64,
}

#[derive(sqlx::FromRow)]
pub(crate) struct BaselineRow {
    pub id: i64,
    pub branch: String,
    pub quota: i64,
    pub occupied: i64,
}

impl TryFrom<BaselineRow> for PositionBaseline {
    type Error = sqlx::Error;

    fn try_from(row: BaselineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PositionId(row.id),
            branch: row.branch,
            quota: count(row.quota)?,
            occupied: count(row.occupied)?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AssignmentRow {
    pub teacher_id: String,
    pub period_id: i64,
    pub position_id: Option<i64>,
    pub rank: Option<i64>,
    pub status: String,
    pub placement_points: f64,
    pub assigned_at: Option<DateTime>,
    pub run_id: i64,
}

impl TryFrom<AssignmentRow> for AssignmentRecord {
    type Error = sqlx::Error;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        let status: AssignmentStatus = row.status.parse().map_err(decode)?;
        let outcome = match (status, row.position_id, row.rank) {
            (AssignmentStatus::Assigned, Some(position_id), Some(value)) => Outcome::Assigned {
                position_id: PositionId(position_id),
                rank: rank(value)?,
            },
            (AssignmentStatus::Unassigned, _, _) => Outcome::Unassigned,
            _ => {
                return Err(sqlx::Error::Decode(
                    "assigned row without position or rank".into(),
                ));
            }
        };
        Ok(Self {
            teacher_id: teacher_id(row.teacher_id)?,
            period_id: PeriodId(row.period_id),
            outcome,
            placement_points: points(row.placement_points)?,
            assigned_at: row.assigned_at.map(Into::into),
            run_id: RunId(row.run_id),
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AssignedRowRow {
    pub teacher_id: String,
    pub first_name: String,
    pub last_name: String,
    pub branch: String,
    pub placement_points: f64,
    pub position_id: i64,
    pub school_name: String,
    pub district: String,
    pub rank: i64,
    pub assigned_at: Option<DateTime>,
}

impl TryFrom<AssignedRowRow> for AssignedRow {
    type Error = sqlx::Error;

    fn try_from(row: AssignedRowRow) -> Result<Self, Self::Error> {
        Ok(Self {
            teacher_id: teacher_id(row.teacher_id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            branch: row.branch,
            placement_points: points(row.placement_points)?,
            position_id: PositionId(row.position_id),
            school_name: row.school_name,
            district: row.district,
            rank: rank(row.rank)?,
            assigned_at: row.assigned_at.map(Into::into),
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct UnassignedRowRow {
    pub teacher_id: String,
    pub first_name: String,
    pub last_name: String,
    pub branch: String,
    pub placement_points: f64,
    pub current_assignment: Option<String>,
}

impl TryFrom<UnassignedRowRow> for UnassignedRow {
    type Error = sqlx::Error;

    fn try_from(row: UnassignedRowRow) -> Result<Self, Self::Error> {
        Ok(Self {
            teacher_id: teacher_id(row.teacher_id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            branch: row.branch,
            placement_points: points(row.placement_points)?,
            current_assignment: row.current_assignment,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PositionFillRow {
    pub position_id: i64,
    pub school_name: String,
    pub district: String,
    pub branch: String,
    pub quota: i64,
    pub filled_count: i64,
}

impl TryFrom<PositionFillRow> for PositionFill {
    type Error = sqlx::Error;

    fn try_from(row: PositionFillRow) -> Result<Self, Self::Error> {
        Ok(Self {
            position_id: PositionId(row.position_id),
            school_name: row.school_name,
            district: row.district,
            branch: row.branch,
            quota: count(row.quota)?,
            filled_count: count(row.filled_count)?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RunRow {
    pub id: i64,
    pub period_id: i64,
    pub started_at: DateTime,
    pub assigned_count: i64,
    pub unassigned_count: i64,
    pub total_teachers: i64,
}

impl TryFrom<RunRow> for RunRecord {
    type Error = sqlx::Error;

    fn try_from(row: RunRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RunId(row.id),
            period_id: PeriodId(row.period_id),
            started_at: row.started_at.into(),
            summary: RunSummary {
                assigned_count: count(row.assigned_count)?.into(),
                unassigned_count: count(row.unassigned_count)?.into(),
                total_teachers: count(row.total_teachers)?.into(),
            },
        })
    }
}

/// Collect rows into records, failing on the first row that does not decode.
pub(crate) fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>, sqlx::Error>
where
    T: TryFrom<R, Error = sqlx::Error>,
{
    rows.into_iter().map(T::try_from).collect()
}
