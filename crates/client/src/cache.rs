//! Tag-indexed query cache with subscriber notification.
//!
//! Every fetchable resource is identified by a [`ResourceKey`]. The first
//! subscription to a key creates a cache entry and triggers a fetch through
//! the [`ResourceTransport`]; later subscriptions attach to the same entry,
//! so at most one fetch per key is ever in flight. Entries carry a set of
//! [`Tag`]s; invalidating a tag marks every entry holding it stale and
//! refetches the ones that still have subscribers, keeping the previous
//! payload visible while the revalidation runs.
//!
//! Entries are reference-counted. When the last subscriber goes away the
//! entry lingers for a grace period so a rapid unmount/remount reuses the
//! cached payload instead of refetching.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use edutage_api::ApiError;
use edutage_types::{ResourceKey, Tag};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::transport::ResourceTransport;

/// How long an entry with no subscribers survives before eviction.
const DEFAULT_EVICTION_GRACE: Duration = Duration::from_secs(30);

/// Lifecycle of one cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Created but never fetched.
    Idle,
    /// A fetch is in flight. Previously fetched data, if any, is retained.
    Loading,
    /// The most recent fetch succeeded.
    Success,
    /// The most recent fetch failed. Data from an earlier success is retained.
    Error,
}

/// Point-in-time view of a cache entry, delivered to subscribers.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub status: QueryStatus,
    pub data: Option<Value>,
    pub error: Option<ApiError>,
}

impl QuerySnapshot {
    fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
        }
    }

    /// Whether the snapshot reflects a finished fetch.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, QueryStatus::Success | QueryStatus::Error)
    }

    /// Collapse the snapshot into the fetch outcome it represents.
    pub fn into_result(self) -> Result<Value, ApiError> {
        match self.status {
            QueryStatus::Success => Ok(self.data.unwrap_or(Value::Null)),
            QueryStatus::Error => Err(self
                .error
                .unwrap_or_else(|| ApiError::Network("fetch failed without an error payload".into()))),
            QueryStatus::Idle | QueryStatus::Loading => {
                Err(ApiError::Network("fetch has not settled".into()))
            }
        }
    }
}

struct CacheEntry {
    snapshot: QuerySnapshot,
    tags: HashSet<Tag>,
    subscribers: usize,
    /// Set when the subscriber count last reached zero.
    idle_since: Option<Instant>,
    stale: bool,
    /// An invalidation arrived while a fetch was in flight; refetch once it
    /// completes instead of issuing a duplicate request.
    pending_refetch: bool,
    in_flight: bool,
    issued_seq: u64,
    applied_seq: u64,
    notify: watch::Sender<QuerySnapshot>,
}

impl CacheEntry {
    fn new() -> Self {
        let (notify, _) = watch::channel(QuerySnapshot::idle());
        Self {
            snapshot: QuerySnapshot::idle(),
            tags: HashSet::new(),
            subscribers: 0,
            idle_since: None,
            stale: false,
            pending_refetch: false,
            in_flight: false,
            issued_seq: 0,
            applied_seq: 0,
            notify,
        }
    }

    /// Transition to `Loading` and hand out the sequence number the spawned
    /// fetch must report back with. Previously fetched data stays visible.
    fn begin_fetch(&mut self) -> u64 {
        self.issued_seq += 1;
        self.in_flight = true;
        self.stale = false;
        self.pending_refetch = false;
        self.snapshot.status = QueryStatus::Loading;
        self.notify.send_replace(self.snapshot.clone());
        self.issued_seq
    }
}

struct CacheState {
    entries: HashMap<ResourceKey, CacheEntry>,
    tag_index: HashMap<Tag, HashSet<ResourceKey>>,
}

impl CacheState {
    /// Drop entries whose subscriber count has been zero past the grace
    /// period, cleaning their tag index slots. In-flight entries survive so
    /// an abandoned fetch can still land in the cache.
    fn sweep_expired(&mut self, grace: Duration) {
        let expired: Vec<ResourceKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| {
                entry.subscribers == 0
                    && !entry.in_flight
                    && entry.idle_since.is_some_and(|since| since.elapsed() >= grace)
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in expired {
            if let Some(entry) = self.entries.remove(&key) {
                for tag in &entry.tags {
                    if let Some(keys) = self.tag_index.get_mut(tag) {
                        keys.remove(&key);
                        if keys.is_empty() {
                            self.tag_index.remove(tag);
                        }
                    }
                }
                debug!(key = %key, "evicted idle cache entry");
            }
        }
    }
}

struct CacheInner {
    state: Mutex<CacheState>,
    transport: Arc<dyn ResourceTransport>,
    eviction_grace: Duration,
}

/// Shared handle to the cache. Cloning is cheap; all clones see one state.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new(transport: Arc<dyn ResourceTransport>) -> Self {
        Self::with_grace(transport, DEFAULT_EVICTION_GRACE)
    }

    /// Cache with an explicit eviction grace period.
    pub fn with_grace(transport: Arc<dyn ResourceTransport>, eviction_grace: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                state: Mutex::new(CacheState {
                    entries: HashMap::new(),
                    tag_index: HashMap::new(),
                }),
                transport,
                eviction_grace,
            }),
        }
    }

    /// Register interest in a key.
    ///
    /// Creates the entry on first subscription and triggers a fetch when the
    /// entry has never been fetched or was invalidated while unobserved. A
    /// key that is already `Loading` gains a subscriber without issuing a
    /// second request. The returned handle carries the current snapshot
    /// immediately and observes every later change; dropping it (or calling
    /// [`QueryHandle::unsubscribe`]) releases the subscription.
    pub fn subscribe(&self, key: ResourceKey, tags: &[Tag]) -> QueryHandle {
        let (receiver, fetch_seq) = {
            let mut state = self.lock_state();
            state.sweep_expired(self.inner.eviction_grace);

            for tag in tags {
                state.tag_index.entry(*tag).or_default().insert(key.clone());
            }

            let entry = state.entries.entry(key.clone()).or_insert_with(CacheEntry::new);
            entry.subscribers += 1;
            entry.idle_since = None;
            entry.tags.extend(tags.iter().copied());

            let fetch_seq = if !entry.in_flight
                && (entry.snapshot.status == QueryStatus::Idle || entry.stale)
            {
                Some(entry.begin_fetch())
            } else {
                None
            };
            (entry.notify.subscribe(), fetch_seq)
        };

        if let Some(seq) = fetch_seq {
            self.spawn_fetch(key.clone(), seq);
        }

        QueryHandle {
            key,
            receiver,
            cache: Arc::downgrade(&self.inner),
        }
    }

    /// Mark every entry holding one of `tags` stale and refetch the ones
    /// with at least one subscriber.
    ///
    /// Entries currently `Loading` are flagged for a follow-up fetch rather
    /// than given a duplicate request; unobserved entries stay stale until
    /// their next subscription. Invalidating an already-stale entry is a
    /// no-op beyond the refetch, so repeated invalidations are idempotent.
    pub fn invalidate(&self, tags: &[Tag]) {
        let mut to_fetch = Vec::new();
        {
            let mut state = self.lock_state();
            state.sweep_expired(self.inner.eviction_grace);

            let affected: HashSet<ResourceKey> = tags
                .iter()
                .filter_map(|tag| state.tag_index.get(tag))
                .flat_map(|keys| keys.iter().cloned())
                .collect();

            for key in affected {
                let Some(entry) = state.entries.get_mut(&key) else {
                    continue;
                };
                entry.stale = true;
                if entry.subscribers == 0 {
                    debug!(key = %key, "invalidated unobserved entry");
                    continue;
                }
                if entry.in_flight {
                    entry.pending_refetch = true;
                    continue;
                }
                let seq = entry.begin_fetch();
                to_fetch.push((key, seq));
            }
        }

        for (key, seq) in to_fetch {
            self.spawn_fetch(key, seq);
        }
    }

    /// Subscribe, wait for the fetch to settle, and return its outcome.
    ///
    /// One-shot convenience for callers that do not keep a live view.
    pub async fn fetch(&self, key: ResourceKey, tags: &[Tag]) -> Result<Value, ApiError> {
        let mut handle = self.subscribe(key, tags);
        handle.settled().await.into_result()
    }

    /// Current snapshot of a key without subscribing or sweeping.
    pub fn peek(&self, key: &ResourceKey) -> Option<QuerySnapshot> {
        self.lock_state().entries.get(key).map(|entry| entry.snapshot.clone())
    }

    /// Number of live entries, including unobserved ones within grace.
    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.inner.state.lock().expect("query cache lock poisoned")
    }

    fn spawn_fetch(&self, key: ResourceKey, seq: u64) {
        let cache = self.clone();
        tokio::spawn(async move {
            debug!(key = %key, seq, "fetch started");
            let result = cache.inner.transport.fetch(&key).await;
            cache.apply_completion(&key, seq, result);
        });
    }

    /// Record a fetch outcome.
    ///
    /// Completions apply in issuance order: a result carrying a sequence at
    /// or below the last applied one has been superseded and is discarded.
    /// An entry whose subscribers all left mid-flight is still updated; the
    /// notification simply reaches nobody.
    fn apply_completion(&self, key: &ResourceKey, seq: u64, result: Result<Value, ApiError>) {
        let follow_up = {
            let mut state = self.lock_state();
            let Some(entry) = state.entries.get_mut(key) else {
                debug!(key = %key, seq, "completion for evicted entry dropped");
                return;
            };

            if seq >= entry.issued_seq {
                entry.in_flight = false;
            }
            if seq <= entry.applied_seq {
                debug!(key = %key, seq, "discarding superseded fetch result");
                None
            } else {
                entry.applied_seq = seq;
                match result {
                    Ok(data) => {
                        entry.snapshot.status = QueryStatus::Success;
                        entry.snapshot.data = Some(data);
                        entry.snapshot.error = None;
                    }
                    Err(error) => {
                        warn!(key = %key, error = %error, "fetch failed");
                        entry.snapshot.status = QueryStatus::Error;
                        entry.snapshot.error = Some(error);
                        // last-known-good data is retained
                    }
                }
                entry.notify.send_replace(entry.snapshot.clone());

                if entry.pending_refetch && entry.subscribers > 0 {
                    Some(entry.begin_fetch())
                } else {
                    // leave `stale` for the next subscriber to act on
                    entry.pending_refetch = false;
                    None
                }
            }
        };

        if let Some(seq) = follow_up {
            self.spawn_fetch(key.clone(), seq);
        }
    }
}

/// A live subscription to one cache entry.
///
/// Dropping the handle releases the subscription; the entry becomes
/// eligible for eviction once its last handle is gone.
pub struct QueryHandle {
    key: ResourceKey,
    receiver: watch::Receiver<QuerySnapshot>,
    cache: Weak<CacheInner>,
}

impl QueryHandle {
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// The entry's current snapshot.
    pub fn snapshot(&self) -> QuerySnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next snapshot change. Returns `false` when the entry
    /// has been evicted and no further change can arrive.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Wait until the entry reaches `Success` or `Error`.
    pub async fn settled(&mut self) -> QuerySnapshot {
        loop {
            let snapshot = self.receiver.borrow_and_update().clone();
            if snapshot.is_settled() {
                return snapshot;
            }
            if self.receiver.changed().await.is_err() {
                return self.receiver.borrow().clone();
            }
        }
    }

    /// Explicitly release the subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for QueryHandle {
    fn drop(&mut self) {
        let Some(inner) = self.cache.upgrade() else {
            return;
        };
        let mut state = inner.state.lock().expect("query cache lock poisoned");
        if let Some(entry) = state.entries.get_mut(&self.key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
            if entry.subscribers == 0 {
                entry.idle_since = Some(Instant::now());
            }
        }
    }
}
