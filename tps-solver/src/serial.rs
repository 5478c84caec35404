use crate::priority_order;
use tps_core::{
    models::{Allocation, Applicant, CapacityLedger, Decision, Outcome, TeacherId},
    ports::Allocator,
};
use tracing::{Level, event};

/// Errors the serial allocator can report.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum AllocationError {
    /// The same teacher was supplied twice, so one decision per teacher is
    /// impossible
    #[error("teacher {0} appears more than once among the applicants")]
    DuplicateApplicant(TeacherId),
}

/// Serial dictatorship: teachers choose one at a time in priority order.
///
/// Each teacher, in turn, receives the best-ranked position of their list
/// that is still in the ledger, has a free seat, and shares their branch.
/// Positions that fail any of these checks are skipped and the scan moves on
/// to the next rank. A teacher whose list is exhausted is left unassigned.
///
/// The outcome is fully determined by the applicants and the ledger; input
/// order does not matter.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialDictatorship;

impl Allocator for SerialDictatorship {
    type Error = AllocationError;

    fn allocate(
        &self,
        mut applicants: Vec<Applicant>,
        mut ledger: CapacityLedger,
    ) -> Result<Allocation, Self::Error> {
        // the order is computed once and never revisited
        applicants.sort_by(priority_order);

        let mut allocation = Allocation::default();
        allocation.decisions.reserve(applicants.len());

        for applicant in applicants {
            let outcome = applicant
                .preferences
                .iter()
                .find(|entry| ledger.try_claim(entry.position_id, &applicant.branch))
                .map_or(Outcome::Unassigned, |entry| Outcome::Assigned {
                    position_id: entry.position_id,
                    rank: entry.rank,
                });

            event!(
                Level::DEBUG,
                teacher_id = %applicant.teacher_id,
                points = %applicant.placement_points,
                status = %outcome.status(),
                position_id = outcome.position_id().map(|id| id.0),
                rank = outcome.rank().map(|rank| rank.get()),
                "decided"
            );

            let decision = Decision {
                placement_points: applicant.placement_points,
                outcome,
            };
            if allocation
                .decisions
                .insert(applicant.teacher_id.clone(), decision)
                .is_some()
            {
                return Err(AllocationError::DuplicateApplicant(applicant.teacher_id));
            }
        }

        Ok(allocation)
    }
}
