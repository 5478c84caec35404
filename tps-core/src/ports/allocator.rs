use crate::models::{Allocation, Applicant, CapacityLedger};

/// Interface for the allocation step of an assignment run.
///
/// An allocator is a pure function of its inputs: it receives every applicant
/// of a period together with the capacity ledger captured before the run, and
/// returns exactly one decision per applicant. It performs no I/O, which lets
/// the storage layer wrap it in a single transaction.
pub trait Allocator {
    /// Error type for allocation failures
    type Error: std::error::Error + Send + Sync + 'static;

    /// Decide an outcome for every applicant.
    ///
    /// The returned decisions are keyed by teacher, in the order they were
    /// taken. `ledger` is consumed; its seats are claimed as decisions are made.
    fn allocate(
        &self,
        applicants: Vec<Applicant>,
        ledger: CapacityLedger,
    ) -> Result<Allocation, Self::Error>;
}
