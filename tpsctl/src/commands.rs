use crate::{io::PathOrStd, roster::Roster};
use clap::Subcommand;
use serde::Serialize;
use time::OffsetDateTime;
use tps_core::{
    models::{PeriodId, PeriodStatus, PositionId, TeacherId},
    ports::PlacementRepository,
};

/// Roster import
pub mod import;
/// Period inspection and lifecycle
pub mod period;
/// Preference submission and listing
pub mod prefs;
/// Assignment runs and their outcome
pub mod run;

/// The available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Load teachers, positions, periods and preferences from a JSON roster
    Import {
        /// The roster document ("-" implies stdin)
        #[arg(default_value = "-")]
        input: PathOrStd,
    },

    /// Print the JSON schema of the roster document
    Schema,

    /// Inspect and manage preference periods
    Period {
        /// What to do with periods
        #[command(subcommand)]
        command: PeriodCommand,
    },

    /// Inspect and submit preference lists
    Prefs {
        /// What to do with preference lists
        #[command(subcommand)]
        command: PrefsCommand,
    },

    /// Assign the teachers of an ended period
    Run {
        /// The period to allocate
        period: PeriodId,
    },

    /// Print the stored assignment rows of a period
    Assignments {
        /// The period
        period: PeriodId,
    },

    /// Print assigned and unassigned teachers and position fill figures
    Report {
        /// The period
        period: PeriodId,
    },

    /// List the runs of a period, newest first
    History {
        /// The period
        period: PeriodId,
    },
}

/// Period subcommands
#[derive(Subcommand)]
pub enum PeriodCommand {
    /// Print a period with its refreshed status
    Show {
        /// The period
        period: PeriodId,
    },
    /// Override the stored status of a period
    SetStatus {
        /// The period
        period: PeriodId,
        /// One of upcoming, active, completed
        status: PeriodStatus,
    },
    /// Bring every stored period status up to date with the clock
    Refresh,
    /// Print the period currently accepting preferences, if any
    Active,
}

/// Preference subcommands
#[derive(Subcommand)]
pub enum PrefsCommand {
    /// Print a teacher's list for a period
    Show {
        /// National ID of the teacher
        teacher: TeacherId,
        /// The period
        period: PeriodId,
    },
    /// Replace a teacher's list; positions are given most preferred first
    Set {
        /// National ID of the teacher
        teacher: TeacherId,
        /// The period
        period: PeriodId,
        /// Position IDs, most preferred first; none withdraws the teacher
        positions: Vec<PositionId>,
    },
    /// List the active positions a teacher may rank
    Positions {
        /// National ID of the teacher
        teacher: TeacherId,
    },
    /// Print every preference of a period
    List {
        /// The period
        period: PeriodId,
    },
    /// Print preference counts of a period
    Stats {
        /// The period
        period: PeriodId,
    },
}

fn json(value: impl Serialize) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

impl Commands {
    /// Execute against `db`, treating `as_of` as the current time.
    pub async fn execute<R: PlacementRepository>(
        self,
        db: &R,
        as_of: OffsetDateTime,
    ) -> anyhow::Result<serde_json::Value> {
        match self {
            Self::Import { input } => {
                let roster: Roster = serde_json::from_reader(input.reader()?)?;
                json(import::import(db, roster, as_of).await?)
            }
            Self::Schema => json(schemars::schema_for!(Roster)),
            Self::Period { command } => match command {
                PeriodCommand::Show { period } => json(period::show(db, period, as_of).await?),
                PeriodCommand::SetStatus { period, status } => {
                    json(period::set_status(db, period, status).await?)
                }
                PeriodCommand::Refresh => json(period::refresh(db, as_of).await?),
                PeriodCommand::Active => json(period::active(db, as_of).await?),
            },
            Self::Prefs { command } => match command {
                PrefsCommand::Show { teacher, period } => {
                    json(prefs::show(db, &teacher, period).await?)
                }
                PrefsCommand::Set {
                    teacher,
                    period,
                    positions,
                } => json(prefs::set(db, &teacher, period, positions, as_of).await?),
                PrefsCommand::Positions { teacher } => {
                    json(prefs::positions(db, &teacher).await?)
                }
                PrefsCommand::List { period } => json(prefs::list(db, period).await?),
                PrefsCommand::Stats { period } => json(prefs::stats(db, period).await?),
            },
            Self::Run { period } => json(run::run(db, period, as_of).await?),
            Self::Assignments { period } => json(run::assignments(db, period, as_of).await?),
            Self::Report { period } => json(run::report(db, period, as_of).await?),
            Self::History { period } => json(run::history(db, period, as_of).await?),
        }
    }
}
