//! Type definitions for the SQLite implementation.
//!
//! The public [`DateTime`] is how timestamps are stored. The row types are
//! internal: they mirror the tables column for column and are converted into
//! the `tps-core` records, re-validating anything the schema cannot check.

mod datetime;
pub use datetime::DateTime;

mod rows;
pub(crate) use rows::*;
