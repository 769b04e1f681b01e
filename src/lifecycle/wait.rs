//! Poll-until-status and wait-until-gone loops.

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::api::ShareApi;
use crate::share::{Share, ShareStatus};

use super::{LifecycleError, PollOutcome, ShareManager};

/// Budget for one wait. A timeout too large to represent as an instant
/// leaves the wait unbounded.
#[derive(Clone, Copy, Debug)]
struct Deadline(Option<Instant>);

impl Deadline {
    fn after(timeout: Duration) -> Self {
        Self(Instant::now().checked_add(timeout))
    }

    /// Returns the pause before the next read, or `None` once expired.
    fn next_pause(self, interval: Duration) -> Option<Duration> {
        let Some(deadline) = self.0 else {
            return Some(interval);
        };
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        Some(interval.min(deadline - now))
    }
}

impl<A> ShareManager<A>
where
    A: ShareApi,
{
    /// Re-reads the share until it reports `desired` or `timeout` elapses.
    ///
    /// The first read happens immediately. A failed read aborts the loop with
    /// that error; reads are never retried here. The last pause is clamped to
    /// the remaining budget, so the call returns within one read of
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the classified read error, including
    /// [`LifecycleError::NotFound`] when the share disappears.
    pub async fn poll_until_status(
        &self,
        share_id: &str,
        desired: &ShareStatus,
        timeout: Duration,
    ) -> Result<PollOutcome, LifecycleError> {
        self.poll_until(share_id, desired, timeout, |_| true).await
    }

    async fn poll_until(
        &self,
        share_id: &str,
        desired: &ShareStatus,
        timeout: Duration,
        settled: impl Fn(&Share) -> bool,
    ) -> Result<PollOutcome, LifecycleError> {
        let deadline = Deadline::after(timeout);
        loop {
            let share = self.get(share_id).await?;
            debug!(
                share_id,
                status = %share.status,
                size_gib = share.size_gib,
                desired = %desired,
                "observed share status"
            );

            if share.status == *desired && settled(&share) {
                return Ok(PollOutcome::Reached(share));
            }

            if self.settings.fail_fast_on_error_status && share.status.is_error() {
                warn!(share_id, status = %share.status, "share reported a failure status");
                return Ok(PollOutcome::Failed(share));
            }

            let Some(pause) = deadline.next_pause(self.settings.poll_interval) else {
                return Ok(PollOutcome::TimedOut {
                    last_observed: Some(share.status),
                });
            };
            sleep(pause).await;
        }
    }

    /// Waits for `desired` and converts every non-success outcome into an
    /// error.
    ///
    /// After an expand the provider may keep reporting `available` at the old
    /// size for a moment, so this can return before the resize starts. Use
    /// [`Self::wait_for_size`] to wait for the new size.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ProvisioningTimeout`] when the budget runs
    /// out, [`LifecycleError::ProvisioningFailed`] when fail-fast observes an
    /// error status, or the read error that aborted polling.
    pub async fn wait_for_status(
        &self,
        share_id: &str,
        desired: &ShareStatus,
        timeout: Duration,
    ) -> Result<Share, LifecycleError> {
        let outcome = self.poll_until_status(share_id, desired, timeout).await?;
        Self::settle(share_id, desired, timeout, outcome)
    }

    /// Waits until the share is `available` with at least `size_gib`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::wait_for_status`].
    pub async fn wait_for_size(
        &self,
        share_id: &str,
        size_gib: u32,
        timeout: Duration,
    ) -> Result<Share, LifecycleError> {
        let desired = ShareStatus::Available;
        let outcome = self
            .poll_until(share_id, &desired, timeout, |share| {
                share.size_gib >= size_gib
            })
            .await?;
        Self::settle(share_id, &desired, timeout, outcome)
    }

    fn settle(
        share_id: &str,
        desired: &ShareStatus,
        timeout: Duration,
        outcome: PollOutcome,
    ) -> Result<Share, LifecycleError> {
        match outcome {
            PollOutcome::Reached(share) => Ok(share),
            PollOutcome::Failed(share) => Err(LifecycleError::ProvisioningFailed {
                share_id: share.id,
                status: share.status,
            }),
            PollOutcome::TimedOut { last_observed } => {
                warn!(share_id, desired = %desired, ?timeout, "timed out waiting for share");
                Err(LifecycleError::ProvisioningTimeout {
                    share_id: share_id.to_owned(),
                    desired: desired.clone(),
                    last_observed,
                })
            }
        }
    }

    /// Polls until the share is no longer visible.
    ///
    /// Right after a delete is accepted the share may still read as `error`
    /// or any other status; only `error_deleting` ends the wait early.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ResidualShare`] when the share outlives the
    /// budget, [`LifecycleError::ProvisioningFailed`] when fail-fast observes
    /// `error_deleting`, or the read error that aborted polling.
    pub async fn wait_until_gone(
        &self,
        share_id: &str,
        timeout: Duration,
    ) -> Result<(), LifecycleError> {
        let deadline = Deadline::after(timeout);
        loop {
            let share = match self.get(share_id).await {
                Ok(share) => share,
                Err(LifecycleError::NotFound { .. }) => return Ok(()),
                Err(err) => return Err(err),
            };
            debug!(share_id, status = %share.status, "share still present");

            if self.settings.fail_fast_on_error_status
                && share.status == ShareStatus::ErrorDeleting
            {
                warn!(share_id, status = %share.status, "share failed to delete");
                return Err(LifecycleError::ProvisioningFailed {
                    share_id: share.id,
                    status: share.status,
                });
            }

            let Some(pause) = deadline.next_pause(self.settings.poll_interval) else {
                return Err(LifecycleError::ResidualShare {
                    share_id: share_id.to_owned(),
                });
            };
            sleep(pause).await;
        }
    }
}
