//! Error types for rule administration and loading
//!
//! Denials are not errors: access checks return a typed
//! [`Decision`](crate::engine::Decision), and a store failure is always a
//! distinct outcome from "you may not do this", so callers can tell an
//! authorization denial from a system that could not decide.

use thiserror::Error;

/// Errors produced by rule administration and rule loading.
#[derive(Debug, Error)]
pub enum AclError {
    /// Grant referenced a role that does not resolve
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Grant called with structurally invalid rule data
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// Underlying rule store failure, surfaced uninterpreted
    #[error("rule store unavailable: {0}")]
    Store(String),

    /// Deadline expired before the decision completed
    #[error("access check timed out")]
    Timeout,
}

/// Result type for engine and administration operations.
pub type AclResult<T> = Result<T, AclError>;

impl AclError {
    /// Check if this error should be logged at error level.
    ///
    /// Caller mistakes (unknown role, invalid rule data) are expected and
    /// should not be logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AclError::Store(_) | AclError::Timeout)
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AclError::UnknownRole(_) => 404,
            AclError::InvalidRule(_) => 400,
            AclError::Store(_) => 503,
            AclError::Timeout => 504,
        }
    }
}
