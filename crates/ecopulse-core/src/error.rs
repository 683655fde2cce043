//! Shared error type across EcoPulse crates.

use thiserror::Error;

/// Stable error codes (used in logs and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Configuration rejected by parsing or validation.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal failure (I/O, runtime setup).
    Internal,
}

impl ErrorCode {
    /// String representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, EcoPulseError>;

/// Unified error type used by core and server.
///
/// Runtime fetch problems are not represented here; those are
/// [`FetchFailure`](crate::reading::FetchFailure) values and never escape the
/// override boundary.
#[derive(Debug, Error)]
pub enum EcoPulseError {
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl EcoPulseError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            EcoPulseError::BadConfig(_) => ErrorCode::BadConfig,
            EcoPulseError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            EcoPulseError::Internal(_) => ErrorCode::Internal,
        }
    }
}
