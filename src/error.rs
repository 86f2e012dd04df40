use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Browser rejected the request: {0}")]
    Host(String),

    #[error("No response from the browser for {operation}")]
    Timeout { operation: &'static str },

    #[error("Browser connection closed")]
    Disconnected,
}

impl AppError {
    /// True when the error only means the referenced tab or window is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
