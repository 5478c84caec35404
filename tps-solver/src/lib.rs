#![warn(missing_docs)]
//! Allocators for teacher placement.
//!
//! The allocators here implement [`tps_core::ports::Allocator`] and are pure
//! computations over the applicants and capacity ledger they are given. They
//! never touch storage, which leaves transaction handling to the repository
//! that drives them.

/// The priority relation between applicants.
mod priority;
pub use priority::priority_order;

/// Serial dictatorship over a fixed priority order.
mod serial;
pub use serial::{AllocationError, SerialDictatorship};
