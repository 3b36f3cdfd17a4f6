//! Crate error type
//!
//! Nothing here is fatal to a round: callers at the boundary log these and
//! carry on with a degraded (silent or unsaved) session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Audio transport unavailable: {0}")]
    AudioUnavailable(String),

    #[error("Audio command failed: {0}")]
    AudioCommand(String),

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
