//! Error types for the heatmap overlay.

use thiserror::Error;

/// Result type alias using HeatmapError.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

/// Primary error type for heatmap operations.
#[derive(Debug, Error)]
pub enum HeatmapError {
    // === Construction Errors ===
    #[error("Invalid color '{0}': expected 6 or 8 hex digits with optional '#'")]
    InvalidColor(String),

    #[error("not supported: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    // === Data Errors ===
    #[error("heatmap call failed{}: {}", status_suffix(.status), .message)]
    FetchFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid heatmap response: {0}")]
    InvalidResponse(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

impl HeatmapError {
    /// Create a FetchFailed error for a non-success HTTP status.
    pub fn fetch_status(status: u16, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create a FetchFailed error for a transport-level failure.
    pub fn fetch_transport(message: impl Into<String>) -> Self {
        Self::FetchFailed {
            status: None,
            message: message.into(),
        }
    }

    /// Create an InvalidResponse error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether this error ends a render cycle rather than rejecting a
    /// configuration up front.
    pub fn is_cycle_failure(&self) -> bool {
        matches!(
            self,
            HeatmapError::FetchFailed { .. } | HeatmapError::InvalidResponse(_)
        )
    }
}

// Conversion from common error types
impl From<serde_json::Error> for HeatmapError {
    fn from(err: serde_json::Error) -> Self {
        HeatmapError::InvalidResponse(format!("JSON error: {}", err))
    }
}
