//! Workdesk core
//!
//! Local persistence and derived aggregates for a single-user project
//! workspace: typed collections over a string-keyed store, the project
//! deletion cascade, progress roll-up, occupancy and activity reports,
//! deadline alerts, attachment files, session state, and snapshot
//! export/import.

pub mod app;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use app::Workdesk;
pub use error::{AppError, Result};
