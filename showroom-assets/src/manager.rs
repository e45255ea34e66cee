use std::any::Any;
use std::fmt::{self, Debug};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use ahash::AHashMap;
use eyre::eyre;
use futures_util::future::{self, BoxFuture, Shared};
use futures_util::FutureExt;
use parking_lot::Mutex;
use tracing::trace;

use crate::event::{StatusEvent, Subscribers, Subscription};
use crate::{AssetKey, AssetKind, AssetLoader, AssetPriority, AssetRecord, LoadError};

pub type AssetFuture = Shared<BoxFuture<'static, Result<Arc<AssetRecord>, LoadError>>>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssetStatus {
    Loaded,
    Loading,
    Idle,
}

#[derive(Clone, Debug)]
pub struct PreloadItem {
    pub key: AssetKey,
    pub kind: AssetKind,
    pub priority: AssetPriority,
}

impl PreloadItem {
    pub fn new(key: impl Into<AssetKey>, kind: AssetKind) -> PreloadItem {
        PreloadItem {
            key: key.into(),
            kind,
            priority: AssetPriority::default(),
        }
    }

    pub fn with_priority(mut self, priority: AssetPriority) -> PreloadItem {
        self.priority = priority;
        self
    }
}

/// Cache + single-flight de-duplicator + per-key status notifier for
/// asynchronously loaded assets. Cheap to clone; clones share one cache.
///
/// Construct one at the application root and hand it to every consumer.
#[derive(Clone)]
pub struct AssetManager {
    shared: Arc<SharedData>,
}

pub(crate) struct SharedData {
    loader: Box<dyn AssetLoader>,
    pub(crate) state: Mutex<State>,
}

#[derive(Default)]
pub(crate) struct State {
    cache: AHashMap<AssetKey, Arc<AssetRecord>>,
    in_flight: AHashMap<AssetKey, AssetFuture>,
    pub(crate) subscribers: Subscribers,
}

impl AssetManager {
    pub fn new<L: AssetLoader>(loader: L) -> AssetManager {
        Self::new_from_dyn(Box::new(loader))
    }

    fn new_from_dyn(loader: Box<dyn AssetLoader>) -> AssetManager {
        AssetManager {
            shared: Arc::new(SharedData {
                loader,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Returns the asset for `key`, loading it if necessary.
    ///
    /// Cached keys resolve immediately without touching the loader. Keys
    /// already in flight return a clone of the pending future, so the loader
    /// runs at most once per concurrent burst. Otherwise the load is spawned
    /// eagerly (must be called within a tokio runtime) and runs to
    /// completion even if every returned future is dropped.
    ///
    /// `priority` is threaded through for future scheduling policy; the
    /// manager does not currently reorder or throttle by it.
    pub fn get(&self, key: &str, kind: AssetKind, priority: AssetPriority) -> AssetFuture {
        let mut state = self.shared.state.lock();

        if let Some(record) = state.cache.get(key) {
            let record = record.clone();
            return future::ready(Ok(record)).boxed().shared();
        }

        if let Some(fut) = state.in_flight.get(key) {
            return fut.clone();
        }

        let key = AssetKey::from(key);
        trace!(%key, ?kind, ?priority, "starting load");

        let task = tokio::spawn(run_load(self.shared.clone(), key.clone(), kind));
        let fut: AssetFuture = async move {
            match task.await {
                Ok(res) => res,
                Err(err) => Err(LoadError::from(eyre!("load task failed: {err}"))),
            }
        }
        .boxed()
        .shared();

        state.in_flight.insert(key.clone(), fut.clone());
        state
            .subscribers
            .send(&key, StatusEvent::Loading { progress: 0.0 });

        fut
    }

    /// Loads every item concurrently. Fails fast on the first failure, but
    /// the sibling loads are never cancelled: each still populates the cache
    /// and notifies subscribers on its own completion.
    pub async fn preload(
        &self,
        items: impl IntoIterator<Item = PreloadItem>,
    ) -> Result<(), LoadError> {
        let futures = items
            .into_iter()
            .map(|item| self.get(&item.key, item.kind, item.priority))
            .collect::<Vec<_>>();

        future::try_join_all(futures).await?;
        Ok(())
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.shared.state.lock().cache.contains_key(key)
    }

    pub fn cached(&self, key: &str) -> Option<Arc<AssetRecord>> {
        self.shared.state.lock().cache.get(key).cloned()
    }

    /// A failed load leaves no residue: the key reverts to `Idle`.
    pub fn status(&self, key: &str) -> AssetStatus {
        let state = self.shared.state.lock();
        if state.cache.contains_key(key) {
            AssetStatus::Loaded
        } else if state.in_flight.contains_key(key) {
            AssetStatus::Loading
        } else {
            AssetStatus::Idle
        }
    }

    pub fn clear_cache(&self) {
        self.shared.state.lock().cache.clear();
    }

    /// Evicts every cached key containing `pattern` as a substring.
    /// In-flight loads and subscribers are untouched; a cleared key still in
    /// flight re-populates the cache when it completes.
    pub fn clear_cache_matching(&self, pattern: &str) {
        let mut state = self.shared.state.lock();
        state.cache.retain(|key, _| !key.contains(pattern));
    }

    pub fn subscribe(&self, key: &str) -> Subscription {
        let key = AssetKey::from(key);
        let mut state = self.shared.state.lock();
        let (id, receiver) = state.subscribers.insert(key.clone());
        Subscription::new(Arc::downgrade(&self.shared), key, id, receiver)
    }
}

impl Debug for AssetManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("AssetManager")
            .field("cached", &state.cache.len())
            .field("in_flight", &state.in_flight.len())
            .finish_non_exhaustive()
    }
}

async fn run_load(
    shared: Arc<SharedData>,
    key: AssetKey,
    kind: AssetKind,
) -> Result<Arc<AssetRecord>, LoadError> {
    // A panicking loader must not wedge the key in `Loading`: the unwind is
    // caught and folded into the failure path so the in-flight entry still
    // goes away and subscribers still hear `Failed`.
    let result = match AssertUnwindSafe(shared.loader.load(&key, kind))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => Err(eyre!("asset loader panicked: {}", panic_message(&*panic))),
    };

    // Bookkeeping for both outcomes happens under one lock, before any
    // caller's future resolves. The in-flight entry always goes away;
    // failures are never cached.
    let mut state = shared.state.lock();
    state.in_flight.remove(&key);

    match result {
        Ok(record) => {
            let record = Arc::new(record);
            state.cache.insert(key.clone(), record.clone());
            state.subscribers.send(
                &key,
                StatusEvent::Loaded {
                    record: record.clone(),
                },
            );
            trace!(%key, "asset loaded");
            Ok(record)
        }
        Err(report) => {
            let error = LoadError::from(report);
            state.subscribers.send(
                &key,
                StatusEvent::Failed {
                    error: error.clone(),
                },
            );
            trace!(%key, %error, "asset load failed");
            Err(error)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
