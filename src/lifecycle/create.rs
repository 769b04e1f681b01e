//! Share creation.
//!
//! The remote API does not deduplicate by name, so re-running a create after
//! a timeout would normally leave a second billable share behind. Before
//! creating, the manager looks for a share it already owns under the same
//! name and, if one exists with a compatible shape, waits on that instead.

use tracing::info;

use crate::api::{CreateShareRequest, ShareApi};
use crate::share::{Share, ShareSpec, ShareStatus};

use super::{LifecycleError, ShareManager};

impl<A> ShareManager<A>
where
    A: ShareApi,
{
    /// Creates a share and waits until the provider reports it `available`.
    ///
    /// A timeout leaves the share in place: the provider may still finish
    /// provisioning it, and a later call with the same name adopts it.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Validation`] for a malformed spec,
    /// [`LifecycleError::Rejected`] when the provider refuses the request (no
    /// polling happens then), [`LifecycleError::ProvisioningTimeout`] or
    /// [`LifecycleError::ProvisioningFailed`] when the share does not
    /// converge, and the adoption errors described on [`LifecycleError`].
    pub async fn create(&self, spec: &ShareSpec) -> Result<Share, LifecycleError> {
        spec.validate()?;
        let description = spec
            .description
            .clone()
            .unwrap_or_else(|| self.settings.ownership_tag.clone());

        let share = if let Some(existing) = self.find_adoptable(spec, &description).await? {
            info!(
                share_id = %existing.id,
                name = %spec.name,
                status = %existing.status,
                "adopting existing share"
            );
            existing
        } else {
            let request = CreateShareRequest {
                name: spec.name.clone(),
                protocol: spec.protocol,
                size_gib: spec.size_gib,
                description,
                availability_zone: self.settings.availability_zone.clone(),
            };
            info!(
                name = %request.name,
                protocol = %request.protocol,
                size_gib = request.size_gib,
                "requesting share creation"
            );
            self.api.create_share(&request).await?
        };

        info!(share_id = %share.id, status = %share.status, "waiting for share to become available");
        let ready = self
            .wait_for_status(&share.id, &ShareStatus::Available, self.settings.wait_timeout)
            .await?;
        info!(share_id = %ready.id, size_gib = ready.size_gib, "share available");
        Ok(ready)
    }

    async fn find_adoptable(
        &self,
        spec: &ShareSpec,
        description: &str,
    ) -> Result<Option<Share>, LifecycleError> {
        if !self.settings.adopt_existing_by_name || spec.name.is_empty() {
            return Ok(None);
        }

        let mut owned: Vec<Share> = self
            .api
            .list_shares_by_name(&spec.name)
            .await?
            .into_iter()
            .filter(|share| share.name == spec.name)
            .filter(|share| share.description.as_deref() == Some(description))
            .filter(|share| !matches!(share.status, ShareStatus::Deleting | ShareStatus::ErrorDeleting))
            .collect();

        if owned.len() > 1 {
            return Err(LifecycleError::AmbiguousName {
                name: spec.name.clone(),
                count: owned.len(),
            });
        }

        let Some(existing) = owned.pop() else {
            return Ok(None);
        };

        if existing.protocol != spec.protocol || existing.size_gib != spec.size_gib {
            return Err(LifecycleError::NameConflict {
                name: spec.name.clone(),
                share_id: existing.id,
            });
        }

        Ok(Some(existing))
    }
}
