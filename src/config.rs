//! Engine configuration constants
//!
//! Central location for storage layout names, session keys, and the
//! fixed tuning constants used by the derived aggregates.

// ===== Storage Layout =====

/// File name of the key-value database inside the data directory
pub const DB_FILE_NAME: &str = "workdesk.db";

/// Directory inside the data directory holding attachment files
pub const ATTACHMENTS_DIR: &str = "attachments";

// ===== Session Keys =====

/// Key under which the signed-in user record is persisted
pub const CURRENT_USER_KEY: &str = "current_user";

/// Key under which the opaque session token is persisted.
/// The token is a marker string, not a cryptographic credential.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

// ===== Aggregate Tuning =====

/// Assumed number of projects one user can run concurrently.
/// Occupancy is the share of this capacity taken by in-progress projects,
/// clamped to 100. A crude heuristic, not a scheduling computation.
pub const PROJECT_CAPACITY: u32 = 5;

/// Number of projects listed in the hours-by-project report section,
/// ranked by total logged hours.
pub const REPORT_TOP_PROJECTS: usize = 5;
