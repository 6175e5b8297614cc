//! Error kinds for a cycler run.

use thiserror::Error;

/// Errors surfaced by the cycler.
///
/// All of these propagate synchronously to the driver; none are recovered
/// from except `TransientVisibility`, which the retry layer absorbs up to
/// its budget.
#[derive(Debug, Error)]
pub enum CyclerError {
    /// Missing or malformed credentials, endpoint, or run parameters.
    /// Fatal immediately, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A read does not yet reflect a write that was already confirmed.
    /// Expected on eventually-consistent read paths; absorbed by the retry
    /// executor.
    #[error("read does not yet reflect the confirmed write")]
    TransientVisibility,

    /// The ledger rejected a transaction or failed to confirm it. Fatal for
    /// the run; a higher layer may restart the whole cycle.
    #[error("transaction submission failed: {0}")]
    Submission(String),

    /// A post-close read still found positions for the owner. The close
    /// transaction was confirmed, so this is a correctness failure, not
    /// visibility lag. Never retried.
    #[error("{remaining} position(s) still present after confirmed close")]
    ConsistencyViolation {
        /// How many positions the verification read still returned.
        remaining: usize,
    },

    /// The visibility retry budget ran out. Carries the error from the last
    /// read attempt.
    #[error("position not found after creation: {source}")]
    RetryExhausted {
        /// Last underlying read error.
        #[source]
        source: Box<CyclerError>,
    },

    /// The run was cancelled while waiting between retry attempts.
    #[error("operation cancelled")]
    Cancelled,
}

impl CyclerError {
    /// Whether the retry layer may absorb this error.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientVisibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_violation_reports_count() {
        let err = CyclerError::ConsistencyViolation { remaining: 3 };
        assert_eq!(
            err.to_string(),
            "3 position(s) still present after confirmed close"
        );
    }

    #[test]
    fn test_only_visibility_is_transient() {
        assert!(CyclerError::TransientVisibility.is_transient());
        assert!(!CyclerError::Cancelled.is_transient());
        assert!(!CyclerError::Submission("boom".to_string()).is_transient());
    }
}
