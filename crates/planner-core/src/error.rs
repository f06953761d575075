//! Error types shared by the planner crates.

use thiserror::Error;

/// Failure of a remote operation, as recorded in the session status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request never completed (connect error, timeout, reset).
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The backend answered with an error status or an unusable body.
    #[error("backend rejected request ({status}): {message}")]
    BackendRejection { status: u16, message: String },

    /// The response belongs to a request that has since been superseded.
    #[error("stale response discarded")]
    StaleResponse,
}

/// A user intent that cannot be applied to the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("node {0} is not in the current node set")]
    UnknownNode(String),

    #[error("invalid nearby-nodes query: {0}")]
    InvalidQuery(String),
}
