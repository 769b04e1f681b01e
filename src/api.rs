//! Remote share API abstraction consumed by the lifecycle manager.
//!
//! Every operation is asynchronous on the provider side: a successful
//! response only means the request was accepted. Converging on a target
//! status is the lifecycle manager's job.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::share::{Share, ShareProtocol};

/// Parameters sent to the remote API when creating a share.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateShareRequest {
    /// Share name.
    pub name: String,
    /// Transport protocol.
    pub protocol: ShareProtocol,
    /// Size in gibibytes.
    pub size_gib: u32,
    /// Provenance tag marking the share as manager-owned.
    pub description: String,
    /// Preferred availability zone, when the deployment pins one.
    pub availability_zone: Option<String>,
}

/// Errors reported by a remote share API.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ApiError {
    /// The addressed share does not exist.
    #[error("share {resource} not found")]
    NotFound {
        /// Identifier or name that was looked up.
        resource: String,
    },
    /// The API refused the request (quota, conflict, bad argument).
    #[error("request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Provider fault code, when the body carried one.
        code: Option<String>,
        /// Provider message, verbatim.
        message: String,
    },
    /// The API could not be reached.
    #[error("transport error: {message}")]
    Transport {
        /// Underlying client error.
        message: String,
    },
    /// The API answered with a body that could not be decoded.
    #[error("malformed response: {message}")]
    Decode {
        /// Decoder error.
        message: String,
    },
}

impl ApiError {
    /// Returns `true` when the error means the share is absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Future returned by remote share API operations.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Control-plane operations the lifecycle manager needs from a provider.
pub trait ShareApi: Send + Sync {
    /// Requests a new share. The returned record is usually still `creating`.
    fn create_share<'a>(&'a self, request: &'a CreateShareRequest) -> ApiFuture<'a, Share>;

    /// Reads the current record for a share.
    fn get_share<'a>(&'a self, share_id: &'a str) -> ApiFuture<'a, Share>;

    /// Lists shares carrying exactly the given name.
    fn list_shares_by_name<'a>(&'a self, name: &'a str) -> ApiFuture<'a, Vec<Share>>;

    /// Requests a resize to `new_size_gib`.
    fn expand_share<'a>(&'a self, share_id: &'a str, new_size_gib: u32) -> ApiFuture<'a, ()>;

    /// Requests deletion of a share.
    fn delete_share<'a>(&'a self, share_id: &'a str) -> ApiFuture<'a, ()>;
}
