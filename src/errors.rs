//! Unified application error type.
//! All modules (db, core, server, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    /// A durable write or read failed. In-memory device state is left untouched.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    // ---------------------------
    // Request errors
    // ---------------------------
    #[error("{0}")]
    Validation(String),

    #[error("unknown device: {0}")]
    UnknownDevice(String),

    #[error("Invalid time offset: {0}")]
    InvalidOffset(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Server errors
    // ---------------------------
    #[error("Server error: {0}")]
    Server(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    pub fn esp_id_required() -> Self {
        AppError::Validation("esp_id required".to_string())
    }

    pub fn invalid_mode() -> Self {
        AppError::Validation("invalid mode".to_string())
    }

    /// Message sent back to clients for this error.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::UnknownDevice(_) => "unknown device".to_string(),
            other => other.to_string(),
        }
    }

    /// Reclassify a raw database error raised at the record store seam.
    pub fn into_persistence(self) -> Self {
        match self {
            AppError::Db(e) => AppError::Persistence(e.to_string()),
            other => other,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::UnknownDevice(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
