//! Share resize requests.

use tracing::info;

use crate::api::ShareApi;

use super::{LifecycleError, ShareManager};

impl<A> ShareManager<A>
where
    A: ShareApi,
{
    /// Requests a resize to `new_size_gib`.
    ///
    /// Shares only grow, so the current size is read first and anything that
    /// is not strictly larger is refused locally. The call returns once the
    /// provider accepts the request; callers wait for the new size through
    /// [`Self::wait_for_size`].
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Validation`] for a zero or non-growing size,
    /// [`LifecycleError::NotFound`] when the share is absent, or the
    /// provider's rejection verbatim.
    pub async fn expand(&self, share_id: &str, new_size_gib: u32) -> Result<(), LifecycleError> {
        if new_size_gib == 0 {
            return Err(LifecycleError::Validation(String::from(
                "new size must be a positive integer",
            )));
        }

        let current = self.get(share_id).await?;
        if new_size_gib <= current.size_gib {
            return Err(LifecycleError::Validation(format!(
                "share {share_id} is {} GiB; new size {new_size_gib} GiB must be larger",
                current.size_gib
            )));
        }

        info!(
            share_id,
            from_gib = current.size_gib,
            to_gib = new_size_gib,
            "requesting share expansion"
        );
        self.api.expand_share(share_id, new_size_gib).await?;
        Ok(())
    }
}
