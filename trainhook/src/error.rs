//! Unified error types for trainhook.
//!
//! Hooks report three kinds of failure:
//! - precondition violations (a hook wired up in a way it cannot work)
//! - failures raised by the external trainer or evaluator
//! - filesystem and serialization errors while persisting checkpoints or logs
//!
//! None of these are retried. A hook returning `Err` from `step` ends training.

/// Result type alias for trainhook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for trainhook.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A hook was constructed or wired in a way that violates its contract.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The policy evaluation routine failed or returned unusable data.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// The trainer reported a failure (for example while saving a model).
    #[error("Trainer error: {0}")]
    Trainer(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a precondition error with a message.
    #[must_use]
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create an evaluation error with a message.
    #[must_use]
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Create a trainer error with a message.
    #[must_use]
    pub fn trainer(msg: impl Into<String>) -> Self {
        Self::Trainer(msg.into())
    }

    /// Whether this error is a contract violation rather than a runtime failure.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn precondition_creates_error() {
        let err = Error::precondition("eval env must be single");
        assert!(matches!(err, Error::Precondition(_)));
        assert!(err.is_precondition());
        assert!(err.to_string().contains("eval env must be single"));
    }

    #[test]
    fn evaluation_and_trainer_are_not_preconditions() {
        assert!(!Error::evaluation("empty").is_precondition());
        assert!(!Error::trainer("disk full").is_precondition());
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn from_json_error() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn display_variants() {
        assert!(Error::precondition("msg").to_string().contains("Precondition"));
        assert!(Error::evaluation("msg").to_string().contains("Evaluation"));
        assert!(Error::trainer("msg").to_string().contains("Trainer"));
    }
}
