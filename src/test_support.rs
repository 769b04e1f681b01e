//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, MutexGuard};

use crate::api::{ApiError, ApiFuture, CreateShareRequest, ShareApi};
use crate::lifecycle::DEFAULT_OWNERSHIP_TAG;
use crate::share::{Share, ShareProtocol, ShareStatus};

/// In-memory [`ShareApi`] whose shares move through scripted status
/// progressions.
///
/// Every read pops the next status queued for the share. Once a deleted
/// share's queue is drained it disappears and reads report "not found".
#[derive(Clone, Debug, Default)]
pub struct ScriptedShareApi {
    state: Arc<Mutex<State>>,
}

#[derive(Debug)]
struct Tracked {
    share: Share,
    pending: VecDeque<ShareStatus>,
    vanish_when_drained: bool,
    resize: Option<PendingResize>,
}

#[derive(Debug)]
struct PendingResize {
    size_gib: u32,
    stale_reads: usize,
}

#[derive(Debug, Default)]
struct Script {
    create: Option<Vec<ShareStatus>>,
    expand: Option<Vec<ShareStatus>>,
    delete: Option<Vec<ShareStatus>>,
    keep_after_delete: bool,
    stale_size_reads: usize,
}

#[derive(Debug, Default)]
struct Failures {
    create: Option<ApiError>,
    get: Option<ApiError>,
    expand: Option<ApiError>,
    delete: Option<ApiError>,
}

#[derive(Debug, Default)]
struct Calls {
    create: u32,
    get: u32,
    list: u32,
    expand: u32,
    delete: u32,
}

#[derive(Debug, Default)]
struct State {
    shares: BTreeMap<String, Tracked>,
    script: Script,
    failures: Failures,
    calls: Calls,
    next_id: u32,
    last_create: Option<CreateShareRequest>,
}

/// Builds a share record tagged as manager-owned.
#[must_use]
pub fn owned_share(
    id: &str,
    name: &str,
    protocol: ShareProtocol,
    size_gib: u32,
    status: ShareStatus,
) -> Share {
    Share {
        id: id.to_owned(),
        name: name.to_owned(),
        protocol,
        size_gib,
        status,
        description: Some(DEFAULT_OWNERSHIP_TAG.to_owned()),
        availability_zone: None,
        project_id: None,
        export_location: None,
        created_at: None,
    }
}

/// Builds a rejection as the remote API would report it.
#[must_use]
pub fn rejection(status: u16, message: &str) -> ApiError {
    ApiError::Rejected {
        status,
        code: None,
        message: message.to_owned(),
    }
}

impl ScriptedShareApi {
    /// Creates an API with no shares. New shares read `creating` once and then
    /// `available`; expansions read `extending` once and then `available`;
    /// deletions read `deleting` once and then vanish.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Statuses a newly created share reports on successive reads.
    pub fn script_create(&self, statuses: Vec<ShareStatus>) {
        self.lock().script.create = Some(statuses);
    }

    /// Statuses a resized share reports on successive reads.
    pub fn script_expand(&self, statuses: Vec<ShareStatus>) {
        self.lock().script.expand = Some(statuses);
    }

    /// Number of reads after an accepted expand that still report the old
    /// size.
    pub fn delay_resize(&self, reads: usize) {
        self.lock().script.stale_size_reads = reads;
    }

    /// Statuses a deleted share reports before it vanishes.
    pub fn script_delete(&self, statuses: Vec<ShareStatus>) {
        self.lock().script.delete = Some(statuses);
    }

    /// Keeps deleted shares visible in `deleting` forever.
    pub fn keep_after_delete(&self) {
        self.lock().script.keep_after_delete = true;
    }

    /// Makes every create call fail with `error`.
    pub fn fail_create(&self, error: ApiError) {
        self.lock().failures.create = Some(error);
    }

    /// Makes every read fail with `error`.
    pub fn fail_get(&self, error: ApiError) {
        self.lock().failures.get = Some(error);
    }

    /// Makes every expand call fail with `error`.
    pub fn fail_expand(&self, error: ApiError) {
        self.lock().failures.expand = Some(error);
    }

    /// Makes every delete call fail with `error`.
    pub fn fail_delete(&self, error: ApiError) {
        self.lock().failures.delete = Some(error);
    }

    /// Seeds an existing share that reports its status unchanged.
    pub fn insert_share(&self, share: Share) {
        self.insert_with_progression(share, Vec::new());
    }

    /// Seeds an existing share that reports `statuses` on its next reads.
    pub fn insert_with_progression(&self, share: Share, statuses: Vec<ShareStatus>) {
        self.lock().shares.insert(
            share.id.clone(),
            Tracked {
                share,
                pending: statuses.into(),
                vanish_when_drained: false,
                resize: None,
            },
        );
    }

    /// Returns the stored record without consuming a scripted status.
    #[must_use]
    pub fn peek(&self, share_id: &str) -> Option<Share> {
        self.lock()
            .shares
            .get(share_id)
            .map(|tracked| tracked.share.clone())
    }

    /// Returns the number of shares currently visible.
    #[must_use]
    pub fn share_count(&self) -> usize {
        self.lock().shares.len()
    }

    /// Returns the last create request received.
    #[must_use]
    pub fn last_create_request(&self) -> Option<CreateShareRequest> {
        self.lock().last_create.clone()
    }

    /// Number of create calls received.
    #[must_use]
    pub fn create_calls(&self) -> u32 {
        self.lock().calls.create
    }

    /// Number of read calls received.
    #[must_use]
    pub fn get_calls(&self) -> u32 {
        self.lock().calls.get
    }

    /// Number of list-by-name calls received.
    #[must_use]
    pub fn list_calls(&self) -> u32 {
        self.lock().calls.list
    }

    /// Number of expand calls received.
    #[must_use]
    pub fn expand_calls(&self) -> u32 {
        self.lock().calls.expand
    }

    /// Number of delete calls received.
    #[must_use]
    pub fn delete_calls(&self) -> u32 {
        self.lock().calls.delete
    }
}

fn not_found(share_id: &str) -> ApiError {
    ApiError::NotFound {
        resource: share_id.to_owned(),
    }
}

impl ShareApi for ScriptedShareApi {
    fn create_share<'a>(&'a self, request: &'a CreateShareRequest) -> ApiFuture<'a, Share> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.create += 1;
            if let Some(err) = state.failures.create.clone() {
                return Err(err);
            }
            state.next_id += 1;
            let share = Share {
                id: format!("share-{}", state.next_id),
                name: request.name.clone(),
                protocol: request.protocol,
                size_gib: request.size_gib,
                status: ShareStatus::Creating,
                description: Some(request.description.clone()),
                availability_zone: request.availability_zone.clone(),
                project_id: None,
                export_location: None,
                created_at: None,
            };
            let pending = state
                .script
                .create
                .clone()
                .unwrap_or_else(|| vec![ShareStatus::Creating, ShareStatus::Available]);
            state.last_create = Some(request.clone());
            state.shares.insert(
                share.id.clone(),
                Tracked {
                    share: share.clone(),
                    pending: pending.into(),
                    vanish_when_drained: false,
                    resize: None,
                },
            );
            Ok(share)
        })
    }

    fn get_share<'a>(&'a self, share_id: &'a str) -> ApiFuture<'a, Share> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.get += 1;
            if let Some(err) = state.failures.get.clone() {
                return Err(err);
            }
            let Some(tracked) = state.shares.get_mut(share_id) else {
                return Err(not_found(share_id));
            };
            apply_resize(tracked);
            if let Some(next) = tracked.pending.pop_front() {
                tracked.share.status = next;
                if needs_export_location(&tracked.share) {
                    tracked.share.export_location =
                        Some(format!("sfs.example.internal:/{}", tracked.share.id));
                }
                return Ok(tracked.share.clone());
            }
            if tracked.vanish_when_drained {
                state.shares.remove(share_id);
                return Err(not_found(share_id));
            }
            Ok(tracked.share.clone())
        })
    }

    fn list_shares_by_name<'a>(&'a self, name: &'a str) -> ApiFuture<'a, Vec<Share>> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.list += 1;
            Ok(state
                .shares
                .values()
                .filter(|tracked| tracked.share.name == name)
                .map(|tracked| tracked.share.clone())
                .collect())
        })
    }

    fn expand_share<'a>(&'a self, share_id: &'a str, new_size_gib: u32) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.expand += 1;
            if let Some(err) = state.failures.expand.clone() {
                return Err(err);
            }
            let pending = state
                .script
                .expand
                .clone()
                .unwrap_or_else(|| vec![ShareStatus::Extending, ShareStatus::Available]);
            let stale_reads = state.script.stale_size_reads;
            let Some(tracked) = state.shares.get_mut(share_id) else {
                return Err(not_found(share_id));
            };
            if stale_reads == 0 {
                tracked.share.size_gib = new_size_gib;
            } else {
                tracked.resize = Some(PendingResize {
                    size_gib: new_size_gib,
                    stale_reads,
                });
            }
            tracked.share.status = ShareStatus::Extending;
            tracked.pending = pending.into();
            Ok(())
        })
    }

    fn delete_share<'a>(&'a self, share_id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.delete += 1;
            if let Some(err) = state.failures.delete.clone() {
                return Err(err);
            }
            let keep = state.script.keep_after_delete;
            let pending = state
                .script
                .delete
                .clone()
                .unwrap_or_else(|| vec![ShareStatus::Deleting]);
            let Some(tracked) = state.shares.get_mut(share_id) else {
                return Err(not_found(share_id));
            };
            tracked.share.status = ShareStatus::Deleting;
            tracked.pending = pending.into();
            tracked.vanish_when_drained = !keep;
            Ok(())
        })
    }
}

fn apply_resize(tracked: &mut Tracked) {
    let Some(resize) = tracked.resize.as_mut() else {
        return;
    };
    if resize.stale_reads == 0 {
        tracked.share.size_gib = resize.size_gib;
        tracked.resize = None;
    } else {
        resize.stale_reads -= 1;
    }
}

fn needs_export_location(share: &Share) -> bool {
    share.status == ShareStatus::Available && share.export_location.is_none()
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Guard that holds the env mutex and cleans up variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
