//! The JSON roster document accepted by `tpsctl import`.
//!
//! Positions and periods receive their identifiers from the database, so the
//! document names them with keys of its own choosing; preferences refer to
//! those keys. Everything is validated before anything is written.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    num::NonZeroU32,
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tps_core::models::{
    MAX_PREFERENCES, PeriodData, Points, PositionData, TeacherId, TeacherRecord,
};

/// Largest quota a single position may carry.
pub const MAX_QUOTA: u32 = 50;

/// Teachers, positions, periods and preferences to load in one go.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Roster {
    /// Teachers to insert or update, keyed by national ID
    #[serde(default)]
    pub teachers: Vec<TeacherEntry>,
    /// Positions to create
    #[serde(default)]
    pub positions: Vec<PositionEntry>,
    /// Preference periods to create
    #[serde(default)]
    pub periods: Vec<PeriodEntry>,
    /// Preference lists to submit, most preferred position first
    #[serde(default)]
    pub preferences: Vec<PreferenceEntry>,
}

/// A teacher of the roster.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TeacherEntry {
    /// 11-digit national ID
    pub national_id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Subject-matter category
    pub branch: String,
    /// Non-negative merit score
    pub placement_points: f64,
    /// Where the teacher currently works
    #[serde(default)]
    pub current_assignment: Option<String>,
}

/// A position of the roster.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PositionEntry {
    /// Document-local name that preferences refer to
    pub key: String,
    /// School offering the position
    pub school_name: String,
    /// District of the school
    pub district: String,
    /// Subject-matter category
    pub branch: String,
    /// Seats, between 1 and 50
    pub quota: u32,
    /// Whether the position takes part in runs
    #[serde(default = "default_true")]
    pub active: bool,
}

/// A preference period of the roster.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PeriodEntry {
    /// Document-local name that preferences refer to
    pub key: String,
    /// Opening instant, RFC 3339
    pub start: String,
    /// Closing instant, RFC 3339
    pub end: String,
}

/// One teacher's preference list for one period.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PreferenceEntry {
    /// National ID of the submitting teacher
    pub national_id: String,
    /// Key of the period
    pub period: String,
    /// Position keys, most preferred first
    pub positions: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Why a roster document was refused.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RosterError {
    /// A single entry failed validation
    #[error("{entry}: {reason}")]
    InvalidEntry {
        /// Which entry, in human terms
        entry: String,
        /// What is wrong with it
        reason: String,
    },
    /// Two positions or two periods share a key
    #[error("{kind} key {key:?} is used more than once")]
    DuplicateKey {
        /// "position" or "period"
        kind: &'static str,
        /// The repeated key
        key: String,
    },
    /// A preference names a key the document does not define
    #[error("{kind} key {key:?} is not defined in the roster")]
    UnknownKey {
        /// "position" or "period"
        kind: &'static str,
        /// The missing key
        key: String,
    },
    /// A preference list is too long or repeats a position
    #[error("preferences of teacher {teacher_id}: {reason}")]
    InvalidPreferences {
        /// The submitting teacher
        teacher_id: TeacherId,
        /// What is wrong with the list
        reason: String,
    },
    /// Preferences of a teacher that is neither in the roster nor stored
    #[error("teacher {0} has preferences but is neither in the roster nor stored")]
    UnknownTeacher(TeacherId),
    /// A listed position belongs to another branch than the teacher
    #[error(
        "preferences of teacher {teacher_id}: position {key:?} is for branch {position_branch}, not {teacher_branch}"
    )]
    BranchMismatch {
        /// The submitting teacher
        teacher_id: TeacherId,
        /// Key of the position
        key: String,
        /// Branch of the position
        position_branch: String,
        /// Branch of the teacher
        teacher_branch: String,
    },
    /// A listed position is imported as inactive
    #[error("preferences of teacher {teacher_id}: position {key:?} is inactive")]
    PositionInactive {
        /// The submitting teacher
        teacher_id: TeacherId,
        /// Key of the position
        key: String,
    },
}

/// A position ready to be created.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidPosition {
    /// Document-local key
    pub key: String,
    /// Data to store
    pub data: PositionData,
    /// Whether to leave the position active
    pub active: bool,
}

/// A preference list whose keys all resolve within the document.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidPreference {
    /// The submitting teacher
    pub teacher_id: TeacherId,
    /// Key of the period
    pub period: String,
    /// Position keys, most preferred first
    pub positions: Vec<String>,
}

/// A roster whose entries and keys are valid on their own.
///
/// Eligibility of the preference lists depends on teachers that may only be
/// stored, so it is checked separately by [`ValidRoster::check_eligibility`].
#[derive(Clone, Debug, PartialEq)]
pub struct ValidRoster {
    /// Teachers to upsert
    pub teachers: Vec<TeacherRecord>,
    /// Positions to create, in document order
    pub positions: Vec<ValidPosition>,
    /// Periods to create, in document order
    pub periods: Vec<(String, PeriodData)>,
    /// Preference lists to submit
    pub preferences: Vec<ValidPreference>,
}

impl Roster {
    /// Check every entry and resolve the cross references.
    pub fn validate(self) -> Result<ValidRoster, RosterError> {
        let teachers = self
            .teachers
            .into_iter()
            .map(TeacherEntry::validate)
            .collect::<Result<Vec<_>, _>>()?;

        let mut position_keys = HashSet::new();
        let mut positions = Vec::with_capacity(self.positions.len());
        for entry in self.positions {
            let position = entry.validate()?;
            if !position_keys.insert(position.key.clone()) {
                return Err(RosterError::DuplicateKey {
                    kind: "position",
                    key: position.key,
                });
            }
            positions.push(position);
        }

        let mut period_keys = HashSet::new();
        let mut periods = Vec::with_capacity(self.periods.len());
        for entry in self.periods {
            let (key, data) = entry.validate()?;
            if !period_keys.insert(key.clone()) {
                return Err(RosterError::DuplicateKey {
                    kind: "period",
                    key,
                });
            }
            periods.push((key, data));
        }

        let mut preferences = Vec::with_capacity(self.preferences.len());
        for entry in self.preferences {
            let teacher_id = parse_teacher_id(&entry.national_id, "preference")?;
            if !period_keys.contains(&entry.period) {
                return Err(RosterError::UnknownKey {
                    kind: "period",
                    key: entry.period,
                });
            }
            if let Some(key) = entry
                .positions
                .iter()
                .find(|key| !position_keys.contains(*key))
            {
                return Err(RosterError::UnknownKey {
                    kind: "position",
                    key: key.clone(),
                });
            }
            if entry.positions.len() > MAX_PREFERENCES {
                return Err(RosterError::InvalidPreferences {
                    teacher_id,
                    reason: format!(
                        "{} positions listed, at most {MAX_PREFERENCES} allowed",
                        entry.positions.len()
                    ),
                });
            }
            let mut listed = HashSet::with_capacity(entry.positions.len());
            if let Some(key) = entry.positions.iter().find(|key| !listed.insert(*key)) {
                return Err(RosterError::InvalidPreferences {
                    teacher_id,
                    reason: format!("position {key:?} is listed more than once"),
                });
            }
            preferences.push(ValidPreference {
                teacher_id,
                period: entry.period,
                positions: entry.positions,
            });
        }

        Ok(ValidRoster {
            teachers,
            positions,
            periods,
            preferences,
        })
    }
}

impl ValidRoster {
    /// Teachers with preferences in the roster but no entry of their own.
    pub fn outside_teachers(&self) -> Vec<TeacherId> {
        let defined: HashSet<&TeacherId> = self.teachers.iter().map(|t| &t.id).collect();
        let mut outside = Vec::new();
        for preference in self.preferences.iter() {
            if !defined.contains(&preference.teacher_id) && !outside.contains(&preference.teacher_id)
            {
                outside.push(preference.teacher_id.clone());
            }
        }
        outside
    }

    /// Check every preference list against the branch of its teacher and the
    /// positions it names.
    ///
    /// A teacher's branch comes from the roster when the roster defines the
    /// teacher, and from `stored` otherwise.
    pub fn check_eligibility(&self, stored: &[TeacherRecord]) -> Result<(), RosterError> {
        let branches: HashMap<&TeacherId, &str> = stored
            .iter()
            .chain(self.teachers.iter())
            .map(|teacher| (&teacher.id, teacher.branch.as_str()))
            .collect();
        let positions: HashMap<&str, &ValidPosition> = self
            .positions
            .iter()
            .map(|position| (position.key.as_str(), position))
            .collect();

        for preference in self.preferences.iter() {
            let teacher_id = &preference.teacher_id;
            let teacher_branch = *branches
                .get(teacher_id)
                .ok_or_else(|| RosterError::UnknownTeacher(teacher_id.clone()))?;

            for key in preference.positions.iter() {
                // Keys were resolved by `Roster::validate`.
                let Some(position) = positions.get(key.as_str()) else {
                    return Err(RosterError::UnknownKey {
                        kind: "position",
                        key: key.clone(),
                    });
                };
                if position.data.branch != teacher_branch {
                    return Err(RosterError::BranchMismatch {
                        teacher_id: teacher_id.clone(),
                        key: key.clone(),
                        position_branch: position.data.branch.clone(),
                        teacher_branch: teacher_branch.to_owned(),
                    });
                }
                if !position.active {
                    return Err(RosterError::PositionInactive {
                        teacher_id: teacher_id.clone(),
                        key: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn parse_teacher_id(value: &str, kind: &str) -> Result<TeacherId, RosterError> {
    TeacherId::new(value).map_err(|error| RosterError::InvalidEntry {
        entry: format!("{kind} of teacher {value:?}"),
        reason: error.to_string(),
    })
}

impl TeacherEntry {
    fn validate(self) -> Result<TeacherRecord, RosterError> {
        let id = parse_teacher_id(&self.national_id, "entry")?;
        let placement_points =
            Points::new(self.placement_points).map_err(|error| RosterError::InvalidEntry {
                entry: format!("teacher {id}"),
                reason: error.to_string(),
            })?;
        Ok(TeacherRecord {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            branch: self.branch,
            placement_points,
            current_assignment: self.current_assignment,
        })
    }
}

impl PositionEntry {
    fn validate(self) -> Result<ValidPosition, RosterError> {
        let quota = NonZeroU32::new(self.quota)
            .filter(|quota| quota.get() <= MAX_QUOTA)
            .ok_or_else(|| RosterError::InvalidEntry {
                entry: format!("position {:?}", self.key),
                reason: format!("quota must be between 1 and {MAX_QUOTA}, got {}", self.quota),
            })?;
        Ok(ValidPosition {
            key: self.key,
            data: PositionData {
                school_name: self.school_name,
                district: self.district,
                branch: self.branch,
                quota,
            },
            active: self.active,
        })
    }
}

impl PeriodEntry {
    fn validate(self) -> Result<(String, PeriodData), RosterError> {
        let invalid = |reason: String| RosterError::InvalidEntry {
            entry: format!("period {:?}", self.key),
            reason,
        };
        let start = OffsetDateTime::parse(&self.start, &Rfc3339)
            .map_err(|error| invalid(format!("start: {error}")))?;
        let end = OffsetDateTime::parse(&self.end, &Rfc3339)
            .map_err(|error| invalid(format!("end: {error}")))?;
        let data = PeriodData::new(start, end).map_err(|error| invalid(error.to_string()))?;
        Ok((self.key, data))
    }
}
