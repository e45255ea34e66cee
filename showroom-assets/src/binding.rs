use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::manager::AssetFuture;
use crate::{
    AssetKind, AssetManager, AssetPriority, AssetRecord, LoadError, StatusEvent, Subscription,
};

/// Unlike [`AssetManager::status`], a binding remembers a failed load as
/// [`Error`](BindingStatus::Error) until a retry starts, so the UI can show
/// the failure rather than an idle placeholder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BindingStatus {
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Pull-based view of one asset's loading state, for UI binding layers:
/// call [`update`](AssetBinding::update) once per frame (or render pass) and
/// read the folded `{status, record, error}` snapshot.
///
/// Dropping the binding unsubscribes; the underlying load keeps running.
pub struct AssetBinding {
    subscription: Subscription,
    future: AssetFuture,
    status: BindingStatus,
    record: Option<Arc<AssetRecord>>,
    error: Option<LoadError>,
}

impl AssetManager {
    pub fn bind(&self, key: &str, kind: AssetKind, priority: AssetPriority) -> AssetBinding {
        // Subscribe first so the initial `Loading` event is not missed.
        let subscription = self.subscribe(key);
        let future = self.get(key, kind, priority);

        let record = self.cached(key);
        let status = match &record {
            Some(_) => BindingStatus::Loaded,
            None => BindingStatus::Loading,
        };

        AssetBinding {
            subscription,
            future,
            status,
            record,
            error: None,
        }
    }
}

impl AssetBinding {
    pub fn key(&self) -> &str {
        self.subscription.key()
    }

    /// Drains pending events into the snapshot.
    pub fn update(&mut self) {
        for event in self.subscription.try_iter() {
            match event {
                StatusEvent::Loading { .. } => {
                    self.status = BindingStatus::Loading;
                }
                StatusEvent::Loaded { record } => {
                    self.status = BindingStatus::Loaded;
                    self.record = Some(record);
                    self.error = None;
                }
                StatusEvent::Failed { error } => {
                    self.status = BindingStatus::Error;
                    self.record = None;
                    self.error = Some(error);
                }
            }
        }
    }

    pub fn status(&self) -> BindingStatus {
        self.status
    }

    pub fn record(&self) -> Option<&Arc<AssetRecord>> {
        self.record.as_ref()
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    pub async fn wait(&self) -> Result<Arc<AssetRecord>, LoadError> {
        self.future.clone().await
    }
}

impl Debug for AssetBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetBinding")
            .field("key", &self.subscription.key())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
