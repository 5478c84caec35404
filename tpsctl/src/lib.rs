#![warn(missing_docs)]
//! Administrative command line for teacher placement.
//!
//! `tpsctl` seeds a placement database from a JSON roster, manages preference
//! periods and preference lists, triggers assignment runs and prints their
//! outcome. Every command writes its result as pretty JSON.

use clap::Parser;
use std::{io::Write as _, path::PathBuf};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tps_core::{
    models::{PeriodId, PeriodStatus, TeacherId},
    ports::{PreferenceFailure, RunFailure},
};
use tps_solver::AllocationError;
use tps_sqlite::Db;

/// The command handlers
pub mod commands;
/// Layered configuration
pub mod config;
/// File or standard stream arguments
pub mod io;
/// The JSON roster document
pub mod roster;

use commands::Commands;
use config::AppConfig;
use io::PathOrStd;

/// Command line arguments
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct BaseArgs {
    /// Path to configuration file
    #[arg(short, long, env = "APP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Evaluate time-dependent rules at this RFC 3339 instant instead of now
    #[arg(long, env = "APP_AS_OF", value_parser = parse_instant)]
    pub as_of: Option<OffsetDateTime>,

    /// Where to write the JSON result ("-" implies stdout)
    #[arg(short, long, global = true, default_value = "-")]
    pub output: PathOrStd,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

fn parse_instant(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(value, &Rfc3339)
}

impl BaseArgs {
    /// Run the command and write its result.
    pub async fn evaluate(self) -> anyhow::Result<()> {
        let value = match self.command {
            Commands::Schema => serde_json::to_value(schemars::schema_for!(roster::Roster))?,
            command => {
                let config = AppConfig::load(self.config.as_deref())?;
                let db = Db::open(&config.database).await?;
                let as_of = self.as_of.unwrap_or_else(OffsetDateTime::now_utc);
                command.execute(&db, as_of).await?
            }
        };

        let mut output = self.output.writer()?;
        serde_json::to_writer_pretty(&mut output, &value)?;
        writeln!(output)?;
        output.flush()?;
        Ok(())
    }
}

/// Errors a command can report besides storage failures
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// The roster document was refused
    #[error("invalid roster: {0}")]
    Roster(#[from] roster::RosterError),

    /// No teacher with this national ID
    #[error("teacher {0} not found")]
    TeacherNotFound(TeacherId),

    /// No period with this ID
    #[error("period {0} not found")]
    PeriodNotFound(PeriodId),

    /// Preferences may only be edited while a period is open
    #[error("period {period_id} is not accepting preferences (status {status})")]
    PeriodNotEditable {
        /// The period
        period_id: PeriodId,
        /// Its refreshed status
        status: PeriodStatus,
    },

    /// A preference list was rejected
    #[error(transparent)]
    Preferences(#[from] PreferenceFailure),

    /// A preference list from the roster was rejected
    #[error("preferences of teacher {teacher_id}: {source}")]
    RosterPreferences {
        /// The submitting teacher
        teacher_id: TeacherId,
        /// Why the list was rejected
        source: PreferenceFailure,
    },

    /// An assignment run was refused or failed
    #[error(transparent)]
    Run(#[from] RunFailure<AllocationError>),
}
