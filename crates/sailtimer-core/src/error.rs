//! Error types for the timer core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Operation not allowed while the timer is running")]
    TimerRunning,
}

pub type Result<T> = std::result::Result<T, Error>;
