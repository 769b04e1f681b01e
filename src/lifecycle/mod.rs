//! Share lifecycle manager.
//!
//! The manager drives a share through create, resize and delete against an
//! asynchronous [`ShareApi`]. Each mutating call only *requests* a transition;
//! convergence is observed by polling until the provider reports the target
//! status or the wait budget runs out. A share is therefore always absent,
//! converging toward `available`, or converging toward absent, and any other
//! outcome surfaces as a [`LifecycleError`].

use std::time::Duration;

use crate::api::ShareApi;
use crate::share::{Share, ShareStatus};

mod create;
mod delete;
mod error;
mod expand;
mod wait;

pub use error::LifecycleError;

/// Default pause between two status reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default budget for a single wait.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(3);
/// Description written on every share the manager provisions.
pub const DEFAULT_OWNERSHIP_TAG: &str = "provisioned-by=sfs.csi.huaweicloud.org";

/// Tuning knobs for a [`ShareManager`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManagerSettings {
    /// Pause between two status reads.
    pub poll_interval: Duration,
    /// Budget used by [`ShareManager::create`] while waiting for `available`.
    pub wait_timeout: Duration,
    /// Description used to mark shares as manager-owned.
    pub ownership_tag: String,
    /// Availability zone requested for new shares.
    pub availability_zone: Option<String>,
    /// Stop polling as soon as the provider reports an error status.
    ///
    /// When disabled a failed share keeps being polled until the budget runs
    /// out and is reported as [`LifecycleError::ProvisioningTimeout`].
    pub fail_fast_on_error_status: bool,
    /// Reuse an existing manager-owned share with the requested name instead
    /// of creating a duplicate.
    pub adopt_existing_by_name: bool,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            ownership_tag: DEFAULT_OWNERSHIP_TAG.to_owned(),
            availability_zone: None,
            fail_fast_on_error_status: true,
            adopt_existing_by_name: true,
        }
    }
}

/// Result of a single poll-until-status run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PollOutcome {
    /// The share reached the desired status.
    Reached(Share),
    /// The provider reported an error status and fail-fast is enabled.
    Failed(Share),
    /// The budget ran out first.
    TimedOut {
        /// Last status observed, if any read succeeded.
        last_observed: Option<ShareStatus>,
    },
}

/// Drives shares through their lifecycle against a [`ShareApi`].
///
/// The manager keeps no local copy of any share and holds no locks; the
/// injected API handle is its only shared resource.
#[derive(Clone, Debug)]
pub struct ShareManager<A> {
    api: A,
    settings: ManagerSettings,
}

impl<A> ShareManager<A>
where
    A: ShareApi,
{
    /// Creates a manager around an API handle.
    #[must_use]
    pub const fn new(api: A, settings: ManagerSettings) -> Self {
        Self { api, settings }
    }

    /// Overrides the polling interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.settings.poll_interval = interval;
        self
    }

    /// Overrides the wait budget used by [`Self::create`].
    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.settings.wait_timeout = timeout;
        self
    }

    /// Returns the active settings.
    #[must_use]
    pub const fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// Returns the underlying API handle.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Reads the current record for a share. Never cached.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] when the share is absent, or the
    /// classified remote error otherwise.
    pub async fn get(&self, share_id: &str) -> Result<Share, LifecycleError> {
        Ok(self.api.get_share(share_id).await?)
    }
}

#[cfg(test)]
mod tests;
