//! Strongly-typed identifiers.
//!
//! Positions, periods and runs are keyed by storage-assigned integers, while
//! teachers are keyed by their 11-digit national ID. Distinct newtypes keep the
//! integer keys from being mixed up at compile time.

use std::{fmt, str::FromStr};

macro_rules! int_id {
    ($struct:ident, $doc:literal) => {
        #[doc = $doc]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $struct(pub i64);

        impl From<i64> for $struct {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$struct> for i64 {
            fn from(value: $struct) -> Self {
                value.0
            }
        }

        impl fmt::Display for $struct {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $struct {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

int_id!(PositionId, "Surrogate key of a school position");
int_id!(PeriodId, "Surrogate key of a preference period");
int_id!(RunId, "Surrogate key of one execution of the assignment engine");

/// Number of digits in a national ID.
const NATIONAL_ID_LEN: usize = 11;

/// A teacher's national ID: exactly 11 ASCII digits.
///
/// The ordering is plain lexicographic, which for fixed-width digit strings
/// coincides with numeric order. It is the tie-break of the allocation
/// priority, so it must stay total and independent of storage order.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeacherId(String);

impl TeacherId {
    /// Validate and wrap a national ID.
    pub fn new(value: impl Into<String>) -> Result<Self, TeacherIdError> {
        let value = value.into();
        if value.len() != NATIONAL_ID_LEN {
            return Err(TeacherIdError::Length(value.len()));
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TeacherIdError::NonDigit);
        }
        Ok(Self(value))
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TeacherId {
    type Error = TeacherIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeacherId> for String {
    fn from(value: TeacherId) -> Self {
        value.0
    }
}

impl FromStr for TeacherId {
    type Err = TeacherIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors produced when parsing a national ID
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum TeacherIdError {
    /// The input does not have exactly 11 characters
    #[error("national ID must have 11 digits, got {0} characters")]
    Length(usize),
    /// The input contains something other than ASCII digits
    #[error("national ID must contain only digits")]
    NonDigit,
}
