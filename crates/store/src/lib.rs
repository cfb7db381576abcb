//! Record store for staffing data.
//!
//! In-memory structured tables (staff assignments and scheduled sessions)
//! with indexed lookup by entity key. Loaded once at startup and immutable
//! for the process lifetime; contains no retrieval logic beyond data access.

pub mod loader;
pub mod store;
pub mod types;

pub use loader::{LoadReport, LoadWarning};
pub use store::{DepartmentSummary, RecordStore, Vocabulary, WorkloadTotal};
pub use types::{parse_hhmm, Day, ScheduledSession, StaffAssignment, TimeRange};
