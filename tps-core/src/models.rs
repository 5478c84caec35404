mod assignment;
mod ids;
mod ledger;
mod map;
mod period;
mod points;
mod position;
mod preference;
mod report;
mod teacher;

pub use assignment::{
    Allocation, Applicant, AssignmentRecord, AssignmentStatus, Decision, Outcome, RunRecord,
    RunSummary,
};
pub use ids::{PeriodId, PositionId, RunId, TeacherId, TeacherIdError};
pub use ledger::{CapacityLedger, PositionBaseline, Seat};
pub use map::Map;
pub use period::{Period, PeriodData, PeriodError, PeriodStatus, StatusParseError, classify};
pub use points::{Points, PointsError};
pub use position::{PositionData, PositionRecord, PositionStatus};
pub use preference::{
    MAX_PREFERENCES, PeriodPreferenceRecord, PreferenceEntry, PreferenceList,
    PreferenceListError, PreferenceRecord, PreferenceStats, Rank, RankError,
};
pub use report::{AssignedRow, AssignmentReport, PositionFill, ReportSummary, UnassignedRow};
pub use teacher::TeacherRecord;
