//! Lifecycle manager for Huawei Cloud SFS file shares.
//!
//! The crate exposes a provider-neutral [`ShareApi`] abstraction, a
//! [`ShareManager`] that drives shares through create → wait for
//! `available` → expand → delete, and an HTTP implementation ([`SfsClient`])
//! for the SFS v2 API. Every remote mutation is asynchronous on the provider
//! side, so the manager converges by polling with a bounded budget.

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod session;
pub mod sfs;
pub mod share;
pub mod test_support;

pub use api::{ApiError, ApiFuture, CreateShareRequest, ShareApi};
pub use config::{ConfigError, SfsConfig};
pub use lifecycle::{
    DEFAULT_OWNERSHIP_TAG, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT, LifecycleError,
    ManagerSettings, PollOutcome, ShareManager,
};
pub use session::{Credentials, Session, SessionError};
pub use sfs::{SetupError, SfsClient};
pub use share::{Share, ShareError, ShareProtocol, ShareSpec, ShareSpecBuilder, ShareStatus};
