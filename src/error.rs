//! # Error Types
//!
//! Custom error types for the Exynos RIL adapter using `thiserror`.

use thiserror::Error;

/// Main error type for the RIL adapter
#[derive(Debug, Error)]
pub enum RilError {
    /// Read past the end of a wire buffer
    #[error("Truncated buffer: needed {needed} bytes at offset {offset}, {available} available")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Structural invariant of a response violated
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Framing or socket level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RilError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        RilError::MalformedResponse(msg.into())
    }
}

/// Result type alias for the RIL adapter
pub type Result<T> = std::result::Result<T, RilError>;
