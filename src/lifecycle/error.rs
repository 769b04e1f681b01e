//! Error types for the share lifecycle manager.

use thiserror::Error;

use crate::api::ApiError;
use crate::share::{ShareError, ShareStatus};

/// Errors surfaced by [`ShareManager`](super::ShareManager) operations.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LifecycleError {
    /// Raised before any remote call when the request is malformed.
    #[error("invalid share request: {0}")]
    Validation(String),
    /// Raised when the remote API refuses a request. Never retried here.
    #[error("remote API rejected the request (status {status}): {message}")]
    Rejected {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Provider fault code, when present.
        code: Option<String>,
        /// Provider message, verbatim.
        message: String,
    },
    /// Raised when the share does not exist.
    #[error("share {share_id} not found")]
    NotFound {
        /// Identifier that was looked up.
        share_id: String,
    },
    /// Raised when polling exhausts its budget. The share may still converge.
    #[error(
        "timeout waiting for share {share_id} to become {desired} (last observed status: {})",
        .last_observed.as_ref().map_or("none", ShareStatus::as_str)
    )]
    ProvisioningTimeout {
        /// Share being waited on.
        share_id: String,
        /// Status the caller asked for.
        desired: ShareStatus,
        /// Last status seen before the budget ran out.
        last_observed: Option<ShareStatus>,
    },
    /// Raised when the provider reports a failed transition while polling.
    #[error("share {share_id} entered failure status {status}")]
    ProvisioningFailed {
        /// Share that failed.
        share_id: String,
        /// Error status reported by the provider.
        status: ShareStatus,
    },
    /// Raised when a deleted share is still visible after the wait budget.
    #[error("share {share_id} still present after deletion")]
    ResidualShare {
        /// Share that was not reclaimed in time.
        share_id: String,
    },
    /// Raised when an owned share with the requested name has a different shape.
    #[error("share name '{name}' is already used by share {share_id} with a different shape")]
    NameConflict {
        /// Requested name.
        name: String,
        /// Existing share carrying that name.
        share_id: String,
    },
    /// Raised when several owned shares carry the requested name.
    #[error("share name '{name}' matches {count} existing shares")]
    AmbiguousName {
        /// Requested name.
        name: String,
        /// Number of owned matches.
        count: usize,
    },
    /// Raised when the remote API cannot be reached or answers garbage.
    #[error("transport error: {message}")]
    Transport {
        /// Underlying error message.
        message: String,
    },
}

impl From<ApiError> for LifecycleError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::NotFound { resource } => Self::NotFound { share_id: resource },
            ApiError::Rejected {
                status,
                code,
                message,
            } => Self::Rejected {
                status,
                code,
                message,
            },
            ApiError::Transport { message } => Self::Transport { message },
            ApiError::Decode { message } => Self::Transport {
                message: format!("malformed response: {message}"),
            },
        }
    }
}

impl From<ShareError> for LifecycleError {
    fn from(value: ShareError) -> Self {
        Self::Validation(value.to_string())
    }
}
