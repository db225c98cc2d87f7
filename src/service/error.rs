//! Service failure codes and their classification.

use thiserror::Error;

/// The request timed out before the backend answered.
pub const TIMED_OUT_CODE: i32 = -1001;
/// The device has no network connection.
pub const NOT_CONNECTED_CODE: i32 = -1009;
/// A fetch task panicked before producing an outcome.
pub const TASK_PANICKED_CODE: i32 = -999;
/// The caller supplied input the service rejected (e.g. a malformed identifier).
pub const VALIDATION_CODE: i32 = 1;

/// Broad category of a failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connectivity-class failure (negative codes).
    Transport,
    /// Caller input was rejected.
    Validation,
    /// Backend-reported failure.
    Server,
    /// Several sub-fetches of one cycle failed.
    Aggregate,
}

impl ErrorKind {
    /// Classify a raw service code.
    ///
    /// `Aggregate` is never produced here; see `CycleReport::error_kind`.
    pub fn from_code(code: i32) -> Self {
        match code {
            c if c < 0 => ErrorKind::Transport,
            VALIDATION_CODE => ErrorKind::Validation,
            _ => ErrorKind::Server,
        }
    }
}

/// Error returned by every service operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("service call failed with code {code}: {message}")]
pub struct ServiceError {
    pub code: i32,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn timed_out() -> Self {
        Self::new(TIMED_OUT_CODE, "request timed out")
    }

    pub fn not_connected() -> Self {
        Self::new(NOT_CONNECTED_CODE, "not connected to the internet")
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(VALIDATION_CODE, message)
    }

    pub fn server(code: i32, message: impl Into<String>) -> Self {
        Self::new(code, message)
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_code(self.code)
    }
}
