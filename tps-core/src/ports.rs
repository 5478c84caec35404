mod allocator;
mod assignment;
mod period;
mod position;
mod preference;
mod teacher;

pub use allocator::Allocator;
pub use assignment::{AssignmentRepository, RunFailure};
pub use period::PeriodRepository;
pub use position::PositionRepository;
pub use preference::{PreferenceFailure, PreferenceRepository};
pub use teacher::TeacherRepository;

/// Base trait for storage backends.
///
/// Every repository method resolves to `Result<_, Self::Error>`, where the
/// error is reserved for faults of the backend itself. Domain refusals are
/// reported in an inner `Result` so callers can tell them apart.
pub trait Repository: Sized + Send + Sync + 'static {
    /// Error type of the storage backend
    type Error: std::error::Error + Send + Sync + 'static;
}

/// The marker trait for a backend that implements every port.
pub trait PlacementRepository:
    TeacherRepository
    + PositionRepository
    + PeriodRepository
    + PreferenceRepository
    + AssignmentRepository
{
}

impl<T> PlacementRepository for T where
    T: TeacherRepository
        + PositionRepository
        + PeriodRepository
        + PreferenceRepository
        + AssignmentRepository
{
}
