//! Error types for the workdesk engine
//!
//! All errors use thiserror for structured error handling.
//! Collection reads downgrade storage failures to empty results (see the
//! store module); everything else propagates through these variants.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("{0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
