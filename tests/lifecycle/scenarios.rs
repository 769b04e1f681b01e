//! BDD scenarios for the share lifecycle.

use rstest_bdd_macros::scenario;

use super::test_helpers::{LifecycleContextResult, lifecycle_context_result};

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Create a share and wait until it is available"
)]
fn scenario_create_available(lifecycle_context_result: LifecycleContextResult) {
    drop(lifecycle_context_result);
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "A rejected create is never polled"
)]
fn scenario_create_rejected(lifecycle_context_result: LifecycleContextResult) {
    drop(lifecycle_context_result);
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Deleting the same share twice succeeds"
)]
fn scenario_delete_twice(lifecycle_context_result: LifecycleContextResult) {
    drop(lifecycle_context_result);
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Expand a share and wait for the new size"
)]
fn scenario_expand(lifecycle_context_result: LifecycleContextResult) {
    drop(lifecycle_context_result);
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Provisioning that never finishes times out"
)]
fn scenario_timeout(lifecycle_context_result: LifecycleContextResult) {
    drop(lifecycle_context_result);
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "A share entering an error status fails fast"
)]
fn scenario_fail_fast(lifecycle_context_result: LifecycleContextResult) {
    drop(lifecycle_context_result);
}
