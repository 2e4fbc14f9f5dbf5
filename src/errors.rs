//! Unified application error type.
//! All modules (ingest, core, settings) return AppError to keep the error
//! handling consistent and easy to manage.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // Remote store
    // ---------------------------
    #[error("Remote store write failed: {0}")]
    StoreWrite(String),

    // ---------------------------
    // Serialization
    // ---------------------------
    #[error("Payload serialization error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Cache serialization error: {0}")]
    CacheFormat(#[from] serde_yaml::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    // ---------------------------
    // Local cache
    // ---------------------------
    #[error("Local cache error: {0}")]
    Cache(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
