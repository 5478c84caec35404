//! Repository trait implementations for the SQLite database.

use crate::Db;
use tps_core::ports::Repository;

mod assignment;
mod period;
mod position;
mod preference;
mod teacher;

impl Repository for Db {
    type Error = sqlx::Error;
}
