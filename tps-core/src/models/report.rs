use super::{Points, PositionId, Rank, TeacherId};
use time::OffsetDateTime;

/// A teacher who won a position.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignedRow {
    /// The teacher
    pub teacher_id: TeacherId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Branch of teacher and position
    pub branch: String,
    /// Merit score
    pub placement_points: Points,
    /// The won position
    pub position_id: PositionId,
    /// School of the won position
    pub school_name: String,
    /// District of the won position
    pub district: String,
    /// Depth in the teacher's list at which the position was won
    pub rank: Rank,
    /// When the run placed the teacher
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339::option"))]
    pub assigned_at: Option<OffsetDateTime>,
}

/// A teacher who received nothing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnassignedRow {
    /// The teacher
    pub teacher_id: TeacherId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Branch of the teacher
    pub branch: String,
    /// Merit score
    pub placement_points: Points,
    /// Where the teacher currently works, if recorded
    pub current_assignment: Option<String>,
}

/// How full an active position is after the latest run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionFill {
    /// The position
    pub position_id: PositionId,
    /// School offering the position
    pub school_name: String,
    /// District of the school
    pub district: String,
    /// Branch of the position
    pub branch: String,
    /// Persisted quota
    pub quota: u32,
    /// Assigned rows pointing at the position
    pub filled_count: u32,
}

impl PositionFill {
    /// Whether every seat is taken.
    pub fn is_full(&self) -> bool {
        self.filled_count >= self.quota
    }
}

/// Headline figures of a report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportSummary {
    /// Number of assigned teachers
    pub total_assigned: u64,
    /// Number of unassigned teachers
    pub total_unassigned: u64,
    /// Number of active positions
    pub total_positions: u64,
    /// Active positions with no free seat
    pub filled_positions: u64,
}

/// Everything downstream reporting needs about a period's outcome.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignmentReport {
    /// Assigned teachers, highest score first
    pub assigned: Vec<AssignedRow>,
    /// Unassigned teachers, highest score first
    pub unassigned: Vec<UnassignedRow>,
    /// Fill figures of each active position
    pub positions: Vec<PositionFill>,
    /// Totals derived from the three lists
    pub summary: ReportSummary,
}

impl AssignmentReport {
    /// Assemble a report and derive its summary.
    pub fn new(
        assigned: Vec<AssignedRow>,
        unassigned: Vec<UnassignedRow>,
        positions: Vec<PositionFill>,
    ) -> Self {
        let summary = ReportSummary {
            total_assigned: assigned.len() as u64,
            total_unassigned: unassigned.len() as u64,
            total_positions: positions.len() as u64,
            filled_positions: positions.iter().filter(|p| p.is_full()).count() as u64,
        };
        Self {
            assigned,
            unassigned,
            positions,
            summary,
        }
    }
}
