//! Unit tests for the share lifecycle manager.

use std::time::Duration;

use super::{LifecycleError, ManagerSettings, PollOutcome, ShareManager};
use crate::share::{ShareProtocol, ShareSpec, ShareStatus};
use crate::test_support::{ScriptedShareApi, owned_share, rejection};

fn fast_settings() -> ManagerSettings {
    ManagerSettings {
        poll_interval: Duration::from_millis(1),
        wait_timeout: Duration::from_millis(200),
        ..ManagerSettings::default()
    }
}

fn manager(api: &ScriptedShareApi) -> ShareManager<ScriptedShareApi> {
    ShareManager::new(api.clone(), fast_settings())
}

fn manager_with(
    api: &ScriptedShareApi,
    adjust: impl FnOnce(&mut ManagerSettings),
) -> ShareManager<ScriptedShareApi> {
    let mut settings = fast_settings();
    adjust(&mut settings);
    ShareManager::new(api.clone(), settings)
}

fn nfs_spec(name: &str, size_gib: u32) -> ShareSpec {
    ShareSpec {
        name: name.to_owned(),
        protocol: ShareProtocol::Nfs,
        size_gib,
        description: None,
    }
}

#[test]
fn default_settings_match_documented_values() {
    let settings = ManagerSettings::default();
    assert_eq!(settings.poll_interval, Duration::from_secs(1));
    assert_eq!(settings.wait_timeout, Duration::from_secs(3));
    assert!(settings.fail_fast_on_error_status);
    assert!(settings.adopt_existing_by_name);
}

#[test]
fn builder_overrides_apply() {
    let api = ScriptedShareApi::new();
    let manager = ShareManager::new(api, ManagerSettings::default())
        .with_poll_interval(Duration::from_millis(5))
        .with_wait_timeout(Duration::from_millis(50));
    assert_eq!(manager.settings().poll_interval, Duration::from_millis(5));
    assert_eq!(manager.settings().wait_timeout, Duration::from_millis(50));
}

#[tokio::test]
async fn get_reads_through_to_the_api_every_time() {
    let api = ScriptedShareApi::new();
    api.insert_share(owned_share(
        "share-a",
        "data",
        ShareProtocol::Nfs,
        3,
        ShareStatus::Available,
    ));
    let manager = manager(&api);

    for _ in 0..3 {
        let share = manager
            .get("share-a")
            .await
            .unwrap_or_else(|err| panic!("get should succeed: {err}"));
        assert_eq!(share.size_gib, 3);
    }
    assert_eq!(api.get_calls(), 3);
}
