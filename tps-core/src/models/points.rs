use std::{cmp::Ordering, fmt};

/// A teacher's placement points: the merit score that decides allocation priority.
///
/// The value is finite and non-negative, which makes the total order below
/// agree with the usual numeric order. Negative zero is normalised to zero on
/// construction so that equal scores compare equal.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "f64", into = "f64")
)]
pub struct Points(f64);

impl Points {
    /// Validate and wrap a score.
    pub fn new(value: f64) -> Result<Self, PointsError> {
        if value.is_nan() {
            Err(PointsError::NaN)
        } else if value.is_infinite() {
            Err(PointsError::Infinity)
        } else if value < 0.0 {
            Err(PointsError::Negative)
        } else {
            Ok(Self(value + 0.0))
        }
    }

    /// The raw score.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Points {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Points {}

impl PartialOrd for Points {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Points {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for Points {
    type Error = PointsError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Points> for f64 {
    fn from(value: Points) -> Self {
        value.0
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors that can occur when creating a score
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PointsError {
    /// Error when the score is NaN
    #[error("NaN value encountered")]
    NaN,
    /// Error when the score is infinite
    #[error("placement points cannot be infinite")]
    Infinity,
    /// Error when the score is below zero
    #[error("placement points cannot be negative")]
    Negative,
}
