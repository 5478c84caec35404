use super::{Points, PositionId, TeacherId};
use std::collections::HashSet;

/// The maximum number of positions a teacher may rank in one period.
pub const MAX_PREFERENCES: usize = 25;

/// A preference rank in `1..=25`; lower is more preferred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u32", into = "u32")
)]
pub struct Rank(u8);

impl Rank {
    /// Validate and wrap a rank.
    pub fn new(value: u32) -> Result<Self, RankError> {
        if (1..=MAX_PREFERENCES as u32).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RankError(value))
        }
    }

    /// The rank as an integer.
    pub fn get(self) -> u32 {
        self.0 as u32
    }
}

impl TryFrom<u32> for Rank {
    type Error = RankError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rank> for u32 {
    fn from(value: Rank) -> Self {
        value.get()
    }
}

/// Error for a rank outside `1..=25`
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("preference rank must be between 1 and 25, got {0}")]
pub struct RankError(pub u32);

/// One entry of a teacher's preference list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PreferenceEntry {
    /// The desired position
    pub position_id: PositionId,
    /// Its place in the teacher's ordering
    pub rank: Rank,
}

/// A teacher's validated preference list for one period.
///
/// At most 25 entries, no rank used twice, no position listed twice. Ranks
/// need not be contiguous. Entries are kept sorted by rank so that iterating
/// the list visits the most preferred position first.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<PreferenceEntry>", into = "Vec<PreferenceEntry>")
)]
pub struct PreferenceList(Vec<PreferenceEntry>);

impl PreferenceList {
    /// Validate a list of entries given in any order.
    pub fn new(mut entries: Vec<PreferenceEntry>) -> Result<Self, PreferenceListError> {
        if entries.len() > MAX_PREFERENCES {
            return Err(PreferenceListError::TooMany(entries.len()));
        }

        let mut positions = HashSet::with_capacity(entries.len());
        for entry in entries.iter() {
            if !positions.insert(entry.position_id) {
                return Err(PreferenceListError::DuplicatePosition(entry.position_id));
            }
        }

        entries.sort_by_key(|entry| entry.rank);
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].rank == pair[1].rank) {
            return Err(PreferenceListError::DuplicateRank(pair[0].rank.get()));
        }

        Ok(Self(entries))
    }

    /// Build a list whose ranks follow the order of `positions` (1-based).
    pub fn from_ordered(
        positions: impl IntoIterator<Item = PositionId>,
    ) -> Result<Self, PreferenceListError> {
        let positions = positions.into_iter().collect::<Vec<_>>();
        let count = positions.len();
        let entries = positions
            .into_iter()
            .zip(1..)
            .map(|(position_id, rank)| {
                Rank::new(rank)
                    .map(|rank| PreferenceEntry { position_id, rank })
                    .map_err(|_| PreferenceListError::TooMany(count))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// Build a list from rows already known to satisfy the invariants.
    ///
    /// Storage enforces uniqueness of rank and position per (teacher, period),
    /// so rows read back from it only need sorting.
    pub fn from_stored(mut entries: Vec<PreferenceEntry>) -> Self {
        entries.sort_by_key(|entry| entry.rank);
        Self(entries)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in rank order, most preferred first.
    pub fn iter(&self) -> std::slice::Iter<'_, PreferenceEntry> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a PreferenceList {
    type Item = &'a PreferenceEntry;
    type IntoIter = std::slice::Iter<'a, PreferenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl TryFrom<Vec<PreferenceEntry>> for PreferenceList {
    type Error = PreferenceListError;

    fn try_from(value: Vec<PreferenceEntry>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PreferenceList> for Vec<PreferenceEntry> {
    fn from(value: PreferenceList) -> Self {
        value.0
    }
}

/// Structural problems with a preference list
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PreferenceListError {
    /// More than 25 entries
    #[error("at most 25 preferences are allowed, got {0}")]
    TooMany(usize),
    /// The same rank appears twice
    #[error("rank {0} is used more than once")]
    DuplicateRank(u32),
    /// The same position appears twice
    #[error("position {0} is listed more than once")]
    DuplicatePosition(PositionId),
}

/// A teacher's own preference, joined with the position's display data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreferenceRecord {
    /// Rank within the teacher's list
    pub rank: Rank,
    /// The ranked position
    pub position_id: PositionId,
    /// School offering the position
    pub school_name: String,
    /// District of the school
    pub district: String,
    /// Branch of the position
    pub branch: String,
}

/// A preference row across all teachers of a period, for reporting.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeriodPreferenceRecord {
    /// The submitting teacher
    pub teacher_id: TeacherId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Merit score of the teacher
    pub placement_points: Points,
    /// Rank within the teacher's list
    pub rank: Rank,
    /// The ranked position
    pub position_id: PositionId,
    /// School offering the position
    pub school_name: String,
    /// District of the school
    pub district: String,
}

/// Aggregate preference figures for a period.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreferenceStats {
    /// Teachers with at least one preference
    pub teachers_with_preferences: u64,
    /// Total preference rows
    pub total_preferences: u64,
    /// Mean list length, absent when nobody has submitted
    pub avg_preferences_per_teacher: Option<f64>,
}
