//! Error types for the remedy dashboard

/// Errors that can occur in the remedy dashboard
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Non-success response from the Remedy API. Displays only the message
    /// so the banner shows what the server said.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Notifier error: {0}")]
    Notifier(String),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
