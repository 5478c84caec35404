#![warn(missing_docs)]
//! Models and ports for assigning teachers to school positions.
//!
//! Teachers rank up to 25 positions of their own branch during a preference
//! period. Once the period ends, an allocator walks the teachers in priority
//! order (placement points descending, national ID ascending) and gives each
//! the best-ranked position that still has a free seat. This crate holds the
//! data types and the traits that storage backends and allocators implement;
//! it performs no I/O of its own.

/// Core domain models for teacher placement.
///
/// These are data structures with the validation that keeps them internally
/// consistent (national ID format, rank bounds, duplicate-free preference
/// lists, period windows). Anything that needs storage lives behind a port.
pub mod models;

/// Interface traits for teacher placement.
///
/// These are the "ports" of a hexagonal layout: repositories for the stored
/// entities and the [`Allocator`](ports::Allocator) that turns applicants and
/// capacities into decisions. Implementations live in separate crates so that
/// the allocation logic can be exercised without a database.
pub mod ports;
