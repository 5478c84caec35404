use super::{
    Map, PeriodId, Points, PositionId, PreferenceList, Rank, RunId, StatusParseError, TeacherId,
};
use std::{fmt, str::FromStr};
use time::OffsetDateTime;

/// A teacher entering an assignment run, with their ranked list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Applicant {
    /// National ID, the priority tie-break
    pub teacher_id: TeacherId,
    /// Branch the chosen position must share
    pub branch: String,
    /// Merit score, the primary priority key
    pub placement_points: Points,
    /// Preferences in rank order
    pub preferences: PreferenceList,
}

/// What a run decided for one teacher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "status", rename_all = "lowercase")
)]
pub enum Outcome {
    /// The teacher won `position_id` at preference depth `rank`
    Assigned {
        /// The won position
        position_id: PositionId,
        /// Rank of the won position in the teacher's list
        rank: Rank,
    },
    /// No listed position had a free seat of the teacher's branch
    Unassigned,
}

impl Outcome {
    /// The stored status label of this outcome.
    pub fn status(&self) -> AssignmentStatus {
        match self {
            Self::Assigned { .. } => AssignmentStatus::Assigned,
            Self::Unassigned => AssignmentStatus::Unassigned,
        }
    }

    /// The won position, if any.
    pub fn position_id(&self) -> Option<PositionId> {
        match self {
            Self::Assigned { position_id, .. } => Some(*position_id),
            Self::Unassigned => None,
        }
    }

    /// The winning rank, if any.
    pub fn rank(&self) -> Option<Rank> {
        match self {
            Self::Assigned { rank, .. } => Some(*rank),
            Self::Unassigned => None,
        }
    }
}

/// Stored status of an assignment row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum AssignmentStatus {
    /// Holds a position
    Assigned,
    /// Holds nothing
    Unassigned,
}

impl AssignmentStatus {
    /// The lowercase label used for storage and display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Unassigned => "unassigned",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned" => Ok(Self::Assigned),
            "unassigned" => Ok(Self::Unassigned),
            other => Err(StatusParseError(other.to_owned())),
        }
    }
}

/// A single decision produced by an allocator.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    /// Score of the teacher when the decision was made
    pub placement_points: Points,
    /// The decision itself
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub outcome: Outcome,
}

/// The complete result of an allocation: one decision per applicant, in the
/// order the decisions were taken.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allocation {
    /// Decisions keyed by teacher, in priority order
    pub decisions: Map<TeacherId, Decision>,
}

impl Allocation {
    /// Tally the decisions.
    pub fn summary(&self) -> RunSummary {
        let assigned_count = self
            .decisions
            .values()
            .filter(|decision| decision.outcome.status() == AssignmentStatus::Assigned)
            .count() as u64;
        let total_teachers = self.decisions.len() as u64;
        RunSummary {
            assigned_count,
            unassigned_count: total_teachers - assigned_count,
            total_teachers,
        }
    }
}

/// Counts returned to whoever triggered a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct RunSummary {
    /// Teachers who won a position
    pub assigned_count: u64,
    /// Teachers left without a position
    pub unassigned_count: u64,
    /// Teachers processed
    pub total_teachers: u64,
}

/// A stored assignment row.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignmentRecord {
    /// The teacher
    pub teacher_id: TeacherId,
    /// The period the run belonged to
    pub period_id: PeriodId,
    /// Position and rank, or nothing
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub outcome: Outcome,
    /// Score at the time of the run
    pub placement_points: Points,
    /// When the position was won; absent for unassigned rows
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339::option"))]
    pub assigned_at: Option<OffsetDateTime>,
    /// The run that wrote this row
    pub run_id: RunId,
}

/// A stored execution of the engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunRecord {
    /// Surrogate key
    pub id: RunId,
    /// The period that was allocated
    pub period_id: PeriodId,
    /// Timestamp the run was executed with
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub started_at: OffsetDateTime,
    /// Counts committed by the run
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub summary: RunSummary,
}
