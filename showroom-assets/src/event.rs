use std::sync::{Arc, Weak};

use ahash::AHashMap;
use crossbeam_channel::{Receiver, Sender};

use crate::manager::SharedData;
use crate::{AssetKey, AssetRecord, LoadError};

#[derive(Clone, Debug)]
pub enum StatusEvent {
    Loading { progress: f32 },
    Loaded { record: Arc<AssetRecord> },
    Failed { error: LoadError },
}

#[derive(Debug)]
struct EventSender {
    id: u64,
    sender: Sender<StatusEvent>,
}

#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    map: AHashMap<AssetKey, Vec<EventSender>>,
    next_id: u64,
}

impl Subscribers {
    pub fn insert(&mut self, key: AssetKey) -> (u64, Receiver<StatusEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let id = self.next_id;
        self.next_id += 1;
        let senders = self.map.entry(key).or_default();
        senders.push(EventSender { id, sender });
        (id, receiver)
    }

    pub fn remove(&mut self, key: &str, id: u64) {
        if let Some(senders) = self.map.get_mut(key) {
            senders.retain(|s| s.id != id);
            if senders.is_empty() {
                self.map.remove(key);
            }
        }
    }

    pub fn send(&self, key: &str, event: StatusEvent) {
        if let Some(senders) = self.map.get(key) {
            for sender in senders {
                let _ = sender.sender.send(event.clone());
            }
        }
    }
}

/// Per-key event stream; receives every [`StatusEvent`] emitted for the key
/// from the moment of subscription onward (no replay of past events).
#[derive(Debug)]
pub struct Subscription {
    shared: Weak<SharedData>,
    key: AssetKey,
    id: u64,
    receiver: Receiver<StatusEvent>,
    disposed: bool,
}

impl Subscription {
    pub(crate) fn new(
        shared: Weak<SharedData>,
        key: AssetKey,
        id: u64,
        receiver: Receiver<StatusEvent>,
    ) -> Subscription {
        Subscription {
            shared,
            key,
            id,
            receiver,
            disposed: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn try_iter(&self) -> impl Iterator<Item = StatusEvent> + '_ {
        self.receiver.try_iter()
    }

    /// Stops delivery of further events. Idempotent; also runs on drop.
    /// Disposing the last subscriber for a key deletes its registry entry.
    pub fn dispose(&mut self) {
        if std::mem::replace(&mut self.disposed, true) {
            return;
        }

        if let Some(shared) = self.shared.upgrade() {
            shared.state.lock().subscribers.remove(&self.key, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}
