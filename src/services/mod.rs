//! Services module
//!
//! Business logic over the stored collections: lifecycle rules, derived
//! aggregates, session state, and bulk snapshot operations.

pub mod alerts;
pub mod attachments;
pub mod notes;
pub mod projects;
pub mod reports;
pub mod session;
pub mod snapshot;
pub mod tasks;

pub use alerts::AlertService;
pub use attachments::AttachmentService;
pub use notes::NoteService;
pub use projects::ProjectService;
pub use reports::{ActivityReport, ProjectHours, ReportService, StatusBreakdown};
pub use session::SessionService;
pub use snapshot::{Snapshot, SnapshotData, SnapshotService};
pub use tasks::TaskService;
