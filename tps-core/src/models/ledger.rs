use super::{Map, PositionId};

/// What the engine needs to know about a position before a run starts.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionBaseline {
    /// The position
    pub id: PositionId,
    /// Branch a teacher must share
    pub branch: String,
    /// Persisted quota
    pub quota: u32,
    /// Seats already held by teachers outside the run's roster
    pub occupied: u32,
}

/// A position's entry in the capacity ledger.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Seat {
    /// Branch a teacher must share
    pub branch: String,
    /// Seats still free in this run
    pub remaining: u32,
}

/// The private, in-memory record of free seats for one run.
///
/// It is built once from persisted data before any decision is written and is
/// then only mutated by [`CapacityLedger::try_claim`]. Positions absent from
/// the ledger (inactive or deleted) can never be claimed.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct CapacityLedger(Map<PositionId, Seat>);

impl CapacityLedger {
    /// Compute the remaining seats of each position from its baseline.
    pub fn from_baseline(positions: impl IntoIterator<Item = PositionBaseline>) -> Self {
        Self(
            positions
                .into_iter()
                .map(|position| {
                    (
                        position.id,
                        Seat {
                            branch: position.branch,
                            remaining: position.quota.saturating_sub(position.occupied),
                        },
                    )
                })
                .collect(),
        )
    }

    /// Free seats of `position_id`, or `None` if it is not in the ledger.
    pub fn remaining(&self, position_id: PositionId) -> Option<u32> {
        self.0.get(&position_id).map(|seat| seat.remaining)
    }

    /// Take one seat of `position_id` for a teacher of `branch`.
    ///
    /// Succeeds only if the position is in the ledger, has a free seat and has
    /// the same branch. On success the seat count is decremented.
    pub fn try_claim(&mut self, position_id: PositionId, branch: &str) -> bool {
        match self.0.get_mut(&position_id) {
            Some(seat) if seat.remaining > 0 && seat.branch == branch => {
                seat.remaining -= 1;
                true
            }
            _ => false,
        }
    }

    /// Iterate over the positions in the ledger.
    pub fn iter(&self) -> impl Iterator<Item = (&PositionId, &Seat)> {
        self.0.iter()
    }

    /// Seats still free across every position.
    pub fn free_seats(&self) -> u64 {
        self.iter().map(|(_, seat)| u64::from(seat.remaining)).sum()
    }

    /// Number of positions in the ledger
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the ledger has no positions
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
