use super::{PositionId, StatusParseError};
use std::{fmt, num::NonZeroU32, str::FromStr};

/// Whether a position takes part in placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum PositionStatus {
    /// Open for preferences and assignment
    #[default]
    Active,
    /// Withdrawn; ignored by the engine
    Inactive,
}

impl PositionStatus {
    /// The lowercase label used for storage and display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PositionStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(StatusParseError(other.to_owned())),
        }
    }
}

/// The administrative data needed to create a position.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionData {
    /// School offering the position
    pub school_name: String,
    /// District of the school
    pub district: String,
    /// Subject-matter category a teacher must share to be eligible
    pub branch: String,
    /// Maximum number of concurrent assignees
    pub quota: NonZeroU32,
}

/// A stored position.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionRecord {
    /// Surrogate key
    pub id: PositionId,
    /// Descriptive and gating data
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub data: PositionData,
    /// Only active positions participate in a run
    pub status: PositionStatus,
}
