//! Idempotent share deletion.

use std::time::Duration;

use tracing::info;

use crate::api::ShareApi;

use super::{LifecycleError, ShareManager};

impl<A> ShareManager<A>
where
    A: ShareApi,
{
    /// Requests deletion of a share.
    ///
    /// A share the provider no longer knows about counts as deleted, so
    /// repeated calls and calls for unknown identifiers succeed. This is the
    /// only place a remote error is turned into success.
    ///
    /// # Errors
    ///
    /// Returns every remote error other than "not found" unchanged.
    pub async fn delete(&self, share_id: &str) -> Result<(), LifecycleError> {
        info!(share_id, "requesting share deletion");
        match self.api.delete_share(share_id).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => {
                info!(share_id, "share not found, assuming it is already deleted");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes a share and waits until reads report it absent.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::delete`] and
    /// [`Self::wait_until_gone`].
    pub async fn delete_and_wait(
        &self,
        share_id: &str,
        timeout: Duration,
    ) -> Result<(), LifecycleError> {
        self.delete(share_id).await?;
        self.wait_until_gone(share_id, timeout).await
    }
}
