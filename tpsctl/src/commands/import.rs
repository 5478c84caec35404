use crate::{
    CliError,
    roster::{Roster, ValidRoster},
};
use serde::Serialize;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tps_core::{
    models::{PeriodId, PositionId, PositionStatus, PreferenceList},
    ports::PlacementRepository,
};
use tracing::{Level, event};

/// What an import wrote, with the identifiers assigned to each key.
#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    /// Teachers inserted or updated
    pub teachers: usize,
    /// Position key to stored ID
    pub positions: BTreeMap<String, PositionId>,
    /// Period key to stored ID
    pub periods: BTreeMap<String, PeriodId>,
    /// Preference lists submitted
    pub preferences: usize,
}

/// Validate a roster and write it.
///
/// Every check that can refuse the document runs before the first write:
/// entries, keys, and the eligibility of each preference list against its
/// teacher's branch and the positions it names. Teachers the roster does not
/// define are looked up in storage for that check. Preference lists are
/// accepted regardless of whether their period is open.
pub async fn import<R: PlacementRepository>(
    db: &R,
    roster: Roster,
    as_of: OffsetDateTime,
) -> anyhow::Result<ImportSummary> {
    let valid = roster.validate().map_err(CliError::from)?;

    let mut stored = Vec::new();
    for teacher_id in valid.outside_teachers() {
        if let Some(teacher) = db.get_teacher(&teacher_id).await? {
            stored.push(teacher);
        }
    }
    valid.check_eligibility(&stored).map_err(CliError::from)?;

    let ValidRoster {
        teachers,
        positions,
        periods,
        preferences,
    } = valid;

    let mut summary = ImportSummary::default();

    for teacher in teachers {
        db.upsert_teacher(teacher).await?;
        summary.teachers += 1;
    }

    for position in positions {
        let record = db.create_position(position.data).await?;
        if !position.active {
            db.set_position_status(record.id, PositionStatus::Inactive)
                .await?;
        }
        summary.positions.insert(position.key, record.id);
    }

    for (key, window) in periods {
        let period = db.create_period(window, as_of).await?;
        summary.periods.insert(key, period.id);
    }

    for preference in preferences {
        // Keys were resolved during validation.
        let period_id = summary.periods[&preference.period];
        let list = PreferenceList::from_ordered(
            preference
                .positions
                .iter()
                .map(|key| summary.positions[key]),
        )
        .map_err(|error| CliError::RosterPreferences {
            teacher_id: preference.teacher_id.clone(),
            source: error.into(),
        })?;

        db.replace_preferences(&preference.teacher_id, period_id, list)
            .await?
            .map_err(|source| CliError::RosterPreferences {
                teacher_id: preference.teacher_id.clone(),
                source,
            })?;
        summary.preferences += 1;
    }

    event!(
        Level::INFO,
        teachers = summary.teachers,
        positions = summary.positions.len(),
        periods = summary.periods.len(),
        preferences = summary.preferences,
        "imported roster"
    );
    Ok(summary)
}
