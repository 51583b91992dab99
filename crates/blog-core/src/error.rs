//! # AppError
//!
//! Centralized error handling for the rusty-blog ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all blog-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Group, Post, User, Follow edge)
    #[error("{0} not found: {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., oversized upload, malformed request body)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Security/Auth failure (e.g., editing somebody else's post)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure (e.g., DB down, disk full)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &str, key: impl ToString) -> Self {
        AppError::NotFound(entity.to_string(), key.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{err:#}"))
    }
}

/// Failures of a `MediaStore` upload.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The bytes are not a decodable image; shown to the user as a form error.
    #[error("{0}")]
    InvalidImage(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// A specialized Result type for rusty-blog logic.
pub type Result<T> = std::result::Result<T, AppError>;
