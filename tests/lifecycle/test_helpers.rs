//! Shared fixtures for lifecycle BDD scenarios.

use std::time::Duration;

use rstest::fixture;
use sfs_shares::test_support::ScriptedShareApi;
use sfs_shares::{LifecycleError, ManagerSettings, Share, ShareManager};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct LifecycleContext {
    pub api: ScriptedShareApi,
    pub settings: ManagerSettings,
    pub share: Option<Share>,
    pub outcome: Option<LifecycleResult>,
    pub elapsed: Option<Duration>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LifecycleResult {
    Success,
    Failure(LifecycleError),
}

#[derive(Clone, Debug, Error)]
pub enum LifecycleTestError {
    #[error("invalid lifecycle fixture: {0}")]
    Fixture(String),
}

pub type LifecycleContextResult = Result<LifecycleContext, LifecycleTestError>;

impl LifecycleContext {
    pub fn manager(&self) -> ShareManager<ScriptedShareApi> {
        ShareManager::new(self.api.clone(), self.settings.clone())
    }

    /// Records a step result, keeping the first failure seen.
    pub fn record(&mut self, result: Result<(), LifecycleError>) {
        if matches!(self.outcome, Some(LifecycleResult::Failure(_))) {
            return;
        }
        self.outcome = Some(match result {
            Ok(()) => LifecycleResult::Success,
            Err(err) => LifecycleResult::Failure(err),
        });
    }
}

#[fixture]
pub fn lifecycle_context_result() -> LifecycleContextResult {
    build_lifecycle_context()
}

#[fixture]
pub fn lifecycle_context(lifecycle_context_result: LifecycleContextResult) -> LifecycleContext {
    lifecycle_context_result
        .unwrap_or_else(|err| panic!("lifecycle context fixture should initialise: {err}"))
}

fn build_lifecycle_context() -> LifecycleContextResult {
    let settings = ManagerSettings {
        poll_interval: Duration::from_millis(5),
        wait_timeout: Duration::from_millis(500),
        ..ManagerSettings::default()
    };
    if settings.poll_interval >= settings.wait_timeout {
        return Err(LifecycleTestError::Fixture(String::from(
            "poll interval must be shorter than the wait budget",
        )));
    }

    Ok(LifecycleContext {
        api: ScriptedShareApi::new(),
        settings,
        share: None,
        outcome: None,
        elapsed: None,
    })
}
