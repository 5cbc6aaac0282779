//! Error types and error code constants for apistub.
//!
//! Two families of failure exist:
//!
//! - **Diagnostics** (unresolvable annotations, duplicate sibling names) are
//!   not errors at all from the caller's point of view. They are plain strings
//!   accumulated on the node that hit them and never propagate.
//! - **Aborting errors** are represented by [`ApiStubError`]. They cover
//!   contract violations (rendering the abstract base node) and bad input
//!   (malformed descriptor files).
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Descriptor errors (malformed or unreadable descriptor set)
//! - `10`: Internal errors (contract violations, unexpected state)

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad flag value, missing file).
    InvalidArguments = 2,
    /// The descriptor set could not be read or parsed.
    DescriptorError = 3,
    /// Internal errors (contract violations, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for apistub.
#[derive(Debug, Error)]
pub enum ApiStubError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Token generation was requested from a node kind that does not render.
    #[error("generate_tokens is not implemented for {kind} '{name}'")]
    NotImplemented { kind: &'static str, name: String },

    /// The descriptor set is malformed.
    #[error("invalid descriptor: {message}")]
    InvalidDescriptor { message: String },

    /// Reading or writing a file failed.
    #[error("io error on {path}: {message}")]
    Io { path: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl ApiStubError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        ApiStubError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an invalid descriptor error.
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        ApiStubError::InvalidDescriptor {
            message: message.into(),
        }
    }

    /// Create an io error for the given path.
    pub fn io(path: impl fmt::Display, err: std::io::Error) -> Self {
        ApiStubError::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiStubError::InternalError {
            message: message.into(),
        }
    }

    /// Stable machine-readable name of the error variant.
    pub fn error_name(&self) -> &'static str {
        match self {
            ApiStubError::InvalidArguments { .. } => "InvalidArguments",
            ApiStubError::NotImplemented { .. } => "NotImplemented",
            ApiStubError::InvalidDescriptor { .. } => "InvalidDescriptor",
            ApiStubError::Io { .. } => "IoError",
            ApiStubError::InternalError { .. } => "InternalError",
        }
    }
}

impl From<&ApiStubError> for OutputErrorCode {
    fn from(err: &ApiStubError) -> Self {
        match err {
            ApiStubError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            ApiStubError::InvalidDescriptor { .. } | ApiStubError::Io { .. } => {
                OutputErrorCode::DescriptorError
            }
            ApiStubError::NotImplemented { .. } | ApiStubError::InternalError { .. } => {
                OutputErrorCode::InternalError
            }
        }
    }
}

impl From<serde_json::Error> for ApiStubError {
    fn from(err: serde_json::Error) -> Self {
        ApiStubError::invalid_descriptor(err.to_string())
    }
}

/// Result type alias for apistub operations.
pub type ApiStubResult<T> = Result<T, ApiStubError>;

// ============================================================================
// Tests
// ============================================================================
