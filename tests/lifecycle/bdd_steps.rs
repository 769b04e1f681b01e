//! BDD step definitions for the share lifecycle.

use std::time::{Duration, Instant};

use rstest_bdd_macros::{given, then, when};
use sfs_shares::test_support::{owned_share, rejection};
use sfs_shares::{LifecycleError, ShareProtocol, ShareSpec, ShareStatus};
use tokio::runtime::Runtime;

use super::test_helpers::{LifecycleContext, LifecycleResult, LifecycleTestError};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Setup(#[from] LifecycleTestError),
    #[error("assertion failed: {0}")]
    Assertion(String),
}

fn runtime() -> Result<Runtime, StepError> {
    Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))
}

#[given("a share service that provisions normally")]
fn provisions_normally(lifecycle_context: LifecycleContext) -> LifecycleContext {
    lifecycle_context
}

#[given("the share service rejects creation with status {status}")]
fn rejects_creation(lifecycle_context: LifecycleContext, status: u16) -> LifecycleContext {
    lifecycle_context
        .api
        .fail_create(rejection(status, "quota exceeded"));
    lifecycle_context
}

#[given("the share service never finishes provisioning")]
fn never_finishes(lifecycle_context: LifecycleContext) -> LifecycleContext {
    lifecycle_context
        .api
        .script_create(vec![ShareStatus::Creating]);
    lifecycle_context
}

#[given("the share service fails provisioning")]
fn fails_provisioning(lifecycle_context: LifecycleContext) -> LifecycleContext {
    lifecycle_context
        .api
        .script_create(vec![ShareStatus::Creating, ShareStatus::Error]);
    lifecycle_context
}

#[given("the share service reports the old size once after resizing")]
fn stale_resize(lifecycle_context: LifecycleContext) -> LifecycleContext {
    lifecycle_context.api.script_expand(vec![
        ShareStatus::Available,
        ShareStatus::Extending,
        ShareStatus::Available,
    ]);
    lifecycle_context.api.delay_resize(1);
    lifecycle_context
}

#[given("a wait budget of {budget} milliseconds polled every {interval} milliseconds")]
fn wait_budget(
    mut lifecycle_context: LifecycleContext,
    budget: u64,
    interval: u64,
) -> LifecycleContext {
    lifecycle_context.settings.wait_timeout = Duration::from_millis(budget);
    lifecycle_context.settings.poll_interval = Duration::from_millis(interval);
    lifecycle_context
}

#[given("an available share \"{id}\" of {size} GiB")]
fn available_share(lifecycle_context: LifecycleContext, id: String, size: u32) -> LifecycleContext {
    lifecycle_context.api.insert_share(owned_share(
        &id,
        "k8s-test1",
        ShareProtocol::Nfs,
        size,
        ShareStatus::Available,
    ));
    lifecycle_context
}

#[when("I create an \"{protocol_name}\" share named \"{name}\" of {size} GiB")]
fn create_share(
    mut lifecycle_context: LifecycleContext,
    protocol_name: String,
    name: String,
    size: u32,
) -> Result<LifecycleContext, StepError> {
    let protocol: ShareProtocol = protocol_name
        .parse()
        .map_err(|err| StepError::Assertion(format!("{err}")))?;
    let spec = ShareSpec {
        name,
        protocol,
        size_gib: size,
        description: None,
    };
    let manager = lifecycle_context.manager();
    let started = Instant::now();
    let result = runtime()?.block_on(async move { manager.create(&spec).await });
    lifecycle_context.elapsed = Some(started.elapsed());
    let outcome = result.map(|share| {
        lifecycle_context.share = Some(share);
    });
    lifecycle_context.record(outcome);
    Ok(lifecycle_context)
}

#[when("I delete share \"{id}\"")]
fn delete_share(
    mut lifecycle_context: LifecycleContext,
    id: String,
) -> Result<LifecycleContext, StepError> {
    let manager = lifecycle_context.manager();
    let result = runtime()?.block_on(async move { manager.delete(&id).await });
    lifecycle_context.record(result);
    Ok(lifecycle_context)
}

#[when("I expand share \"{id}\" to {size} GiB")]
fn expand_share(
    mut lifecycle_context: LifecycleContext,
    id: String,
    size: u32,
) -> Result<LifecycleContext, StepError> {
    let manager = lifecycle_context.manager();
    let result = runtime()?.block_on(async move { manager.expand(&id, size).await });
    lifecycle_context.record(result);
    Ok(lifecycle_context)
}

#[when("I wait for share \"{id}\" to reach {size} GiB")]
fn wait_for_size(
    mut lifecycle_context: LifecycleContext,
    id: String,
    size: u32,
) -> Result<LifecycleContext, StepError> {
    let manager = lifecycle_context.manager();
    let timeout = lifecycle_context.settings.wait_timeout;
    let result =
        runtime()?.block_on(async move { manager.wait_for_size(&id, size, timeout).await });
    let outcome = result.map(|share| {
        lifecycle_context.share = Some(share);
    });
    lifecycle_context.record(outcome);
    Ok(lifecycle_context)
}

#[then("the lifecycle result is successful")]
fn lifecycle_success(lifecycle_context: &LifecycleContext) -> Result<(), StepError> {
    match lifecycle_context.outcome {
        Some(LifecycleResult::Success) => Ok(()),
        Some(LifecycleResult::Failure(ref err)) => Err(StepError::Assertion(format!(
            "expected success, got failure: {err}"
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

#[then("the lifecycle error kind is \"{kind}\"")]
fn lifecycle_error_kind(lifecycle_context: &LifecycleContext, kind: String) -> Result<(), StepError> {
    let Some(LifecycleResult::Failure(err)) = &lifecycle_context.outcome else {
        return Err(StepError::Assertion(String::from(
            "expected failure outcome",
        )));
    };
    let actual = error_kind(err);
    if actual == kind {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected failure kind {kind}, got {actual}: {err}"
        )))
    }
}

#[then("the share status is \"{status}\"")]
fn share_status(lifecycle_context: &LifecycleContext, status: String) -> Result<(), StepError> {
    let share = lifecycle_context
        .share
        .as_ref()
        .ok_or_else(|| StepError::Assertion(String::from("no share recorded")))?;
    if share.status.as_str() == status {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected status {status}, got {}",
            share.status
        )))
    }
}

#[then("the share size is {size} GiB")]
fn share_size(lifecycle_context: &LifecycleContext, size: u32) -> Result<(), StepError> {
    let share = lifecycle_context
        .share
        .as_ref()
        .ok_or_else(|| StepError::Assertion(String::from("no share recorded")))?;
    if share.size_gib == size {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {size} GiB, got {} GiB",
            share.size_gib
        )))
    }
}

#[then("the share service was not polled")]
fn not_polled(lifecycle_context: &LifecycleContext) -> Result<(), StepError> {
    let calls = lifecycle_context.api.get_calls();
    if calls == 0 {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected no status reads, saw {calls}"
        )))
    }
}

#[then("the wait finished within {seconds} seconds")]
fn finished_within(lifecycle_context: &LifecycleContext, seconds: u64) -> Result<(), StepError> {
    let elapsed = lifecycle_context
        .elapsed
        .ok_or_else(|| StepError::Assertion(String::from("no timing recorded")))?;
    if elapsed < Duration::from_secs(seconds) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "wait took {elapsed:?}, budget was {seconds}s"
        )))
    }
}

const fn error_kind(err: &LifecycleError) -> &'static str {
    match err {
        LifecycleError::Validation(_) => "validation",
        LifecycleError::Rejected { .. } => "rejected",
        LifecycleError::NotFound { .. } => "not_found",
        LifecycleError::ProvisioningTimeout { .. } => "timeout",
        LifecycleError::ProvisioningFailed { .. } => "failed",
        LifecycleError::ResidualShare { .. } => "residual",
        LifecycleError::NameConflict { .. } => "name_conflict",
        LifecycleError::AmbiguousName { .. } => "ambiguous_name",
        LifecycleError::Transport { .. } => "transport",
    }
}
