use super::PeriodId;
use std::{fmt, str::FromStr};
use time::OffsetDateTime;

/// Lifecycle of a preference period.
///
/// The variants are declared in lifecycle order, so the derived ordering can
/// be used to move a status forward without ever moving it back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum PeriodStatus {
    /// The window has not opened yet
    Upcoming,
    /// Preferences may be submitted
    Active,
    /// The window is closed; assignment may run
    Completed,
}

impl PeriodStatus {
    /// The lowercase label used for storage and display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Advance a cached status to what the clock says, never backwards.
    ///
    /// An administrative override to `completed` therefore survives, while a
    /// stale `upcoming` or `active` catches up with the wall clock.
    pub fn refresh(self, classified: PeriodStatus) -> PeriodStatus {
        self.max(classified)
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(Self::Upcoming),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(StatusParseError(other.to_owned())),
        }
    }
}

/// Error for a status label that is not recognised
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("unrecognised status: {0}")]
pub struct StatusParseError(pub String);

/// Classify the window `[start, end)` relative to `now`.
pub fn classify(start: OffsetDateTime, end: OffsetDateTime, now: OffsetDateTime) -> PeriodStatus {
    if now < start {
        PeriodStatus::Upcoming
    } else if now < end {
        PeriodStatus::Active
    } else {
        PeriodStatus::Completed
    }
}

/// The window of a period, validated to be non-empty.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "PeriodDataDto", into = "PeriodDataDto")
)]
pub struct PeriodData {
    start: OffsetDateTime,
    end: OffsetDateTime,
}

impl PeriodData {
    /// Create a window, requiring `end` to come after `start`.
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Result<Self, PeriodError> {
        if end <= start {
            Err(PeriodError::EmptyWindow)
        } else {
            Ok(Self { start, end })
        }
    }

    /// Opening instant (inclusive)
    pub fn start(&self) -> OffsetDateTime {
        self.start
    }

    /// Closing instant (exclusive)
    pub fn end(&self) -> OffsetDateTime {
        self.end
    }
}

/// DTO to ensure that we always validate when we deserialize from an untrusted source
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug)]
pub struct PeriodDataDto {
    /// Opening instant
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub start: OffsetDateTime,
    /// Closing instant
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub end: OffsetDateTime,
}

impl TryFrom<PeriodDataDto> for PeriodData {
    type Error = PeriodError;

    fn try_from(value: PeriodDataDto) -> Result<Self, Self::Error> {
        Self::new(value.start, value.end)
    }
}

impl From<PeriodData> for PeriodDataDto {
    fn from(value: PeriodData) -> Self {
        Self {
            start: value.start,
            end: value.end,
        }
    }
}

/// Errors that can occur when defining a period
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PeriodError {
    /// The end of the window is not after its start
    #[error("period end must be after its start")]
    EmptyWindow,
}

/// A stored preference period.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Period {
    /// Surrogate key
    pub id: PeriodId,
    /// The submission window
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub window: PeriodData,
    /// Cached lifecycle status
    pub status: PeriodStatus,
}

impl Period {
    /// The status the clock assigns to this period, ignoring the cache.
    pub fn classify(&self, now: OffsetDateTime) -> PeriodStatus {
        classify(self.window.start, self.window.end, now)
    }

    /// A copy of this period with its cached status brought up to date.
    pub fn refreshed(&self, now: OffsetDateTime) -> Self {
        Self {
            id: self.id,
            window: self.window,
            status: self.status.refresh(self.classify(now)),
        }
    }

    /// Preferences may be edited only inside the window and while active.
    pub fn is_editable(&self, now: OffsetDateTime) -> bool {
        self.classify(now) == PeriodStatus::Active
            && self.status.refresh(self.classify(now)) == PeriodStatus::Active
    }

    /// True once the window has closed, which is when assignment may run.
    pub fn has_ended(&self, now: OffsetDateTime) -> bool {
        now >= self.window.end
    }
}
