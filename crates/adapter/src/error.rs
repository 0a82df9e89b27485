//! Typed failures of backend calls.
//!
//! Every call reports which operation failed; the caller decides whether to
//! retry, keep showing stale data, or surface the error. No call ever hands
//! back a placeholder grid.

use std::time::Duration;

use thiserror::Error;

/// Why a single backend call failed.
#[derive(Debug, Error)]
pub enum CallFailure {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("no grid has been created yet")]
    NoGrid,
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),
    #[error("backend closed the connection")]
    Closed,
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("grid creation failed: {0}")]
    Creation(CallFailure),
    #[error("grid fetch failed: {0}")]
    Fetch(CallFailure),
    #[error("grid advance failed: {0}")]
    Advance(CallFailure),
}

impl BackendError {
    pub fn failure(&self) -> &CallFailure {
        match self {
            BackendError::Creation(f) | BackendError::Fetch(f) | BackendError::Advance(f) => f,
        }
    }

    /// Whether the connection should be dropped and re-established.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.failure(),
            CallFailure::Transport(_)
                | CallFailure::Timeout(_)
                | CallFailure::Closed
                | CallFailure::Protocol(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_operation() {
        let e = BackendError::Fetch(CallFailure::NoGrid);
        assert_eq!(e.to_string(), "grid fetch failed: no grid has been created yet");

        let e = BackendError::Creation(CallFailure::InvalidDimensions { width: 0, height: 3 });
        assert_eq!(
            e.to_string(),
            "grid creation failed: grid dimensions must be positive, got 0x3"
        );
    }

    #[test]
    fn transport_classification() {
        assert!(BackendError::Advance(CallFailure::Closed).is_transport());
        let timeout = CallFailure::Timeout(Duration::from_millis(5));
        assert!(BackendError::Advance(timeout).is_transport());
        assert!(!BackendError::Advance(CallFailure::NoGrid).is_transport());
        assert!(!BackendError::Fetch(CallFailure::Malformed("x".into())).is_transport());
    }
}
