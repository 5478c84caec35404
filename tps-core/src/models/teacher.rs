use super::{Points, TeacherId};

/// A teacher as seen by the placement process.
///
/// Teachers are maintained by administrative action and are treated as
/// immutable while an assignment run is in progress.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeacherRecord {
    /// National ID
    pub id: TeacherId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Subject-matter category; must equal a position's branch for eligibility
    pub branch: String,
    /// Merit score deciding priority
    pub placement_points: Points,
    /// Where the teacher currently works, if recorded
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_assignment: Option<String>,
}
