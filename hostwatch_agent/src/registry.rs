//! Registry of connected streaming clients.
//!
//! The lock only guards set membership. Pushing to a client is a
//! non-blocking offer into that client's own buffer, never I/O.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, watch};

use crate::queue::{offer_or_drop, Offer};
use crate::types::Snapshot;

pub type ClientId = u64;

/// One-shot close signal shared by everything that can end a session.
/// Only the first `fire` wins; later calls are no-ops.
pub struct Teardown {
    fired: AtomicBool,
    closed_tx: watch::Sender<bool>,
}

impl Teardown {
    pub fn new() -> Self {
        let (closed_tx, _) = watch::channel(false);
        Self {
            fired: AtomicBool::new(false),
            closed_tx,
        }
    }

    /// Returns true for the single caller that performed the close.
    pub fn fire(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.closed_tx.send_replace(true);
        true
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Resolves once `fire` has been called (immediately if it already was).
    pub async fn fired(&self) {
        let mut rx = self.closed_tx.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry-side view of a client: its outgoing buffer and close signal.
#[derive(Clone)]
pub struct ClientHandle {
    id: ClientId,
    tx: mpsc::Sender<Arc<Snapshot>>,
    teardown: Arc<Teardown>,
}

impl ClientHandle {
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Offer a snapshot to this client's buffer without waiting.
    pub fn push(&self, snapshot: Arc<Snapshot>) -> Offer {
        offer_or_drop(&self.tx, snapshot)
    }

    pub fn teardown(&self) -> &Arc<Teardown> {
        &self.teardown
    }

    /// Close the client and drop it from `registry`. Only the first call
    /// from any path does anything; returns whether this one did.
    pub fn close(&self, registry: &Registry) -> bool {
        if !self.teardown.fire() {
            return false;
        }
        registry.unregister(self.id);
        true
    }
}

/// Session-side end of a client: receives what the dispatcher pushes.
pub struct ClientFeed {
    pub id: ClientId,
    pub rx: mpsc::Receiver<Arc<Snapshot>>,
}

#[derive(Default)]
pub struct Registry {
    clients: Mutex<HashMap<ClientId, ClientHandle>>,
    next_id: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a client with a `buffer`-deep outgoing queue. The handle is
    /// not registered yet.
    pub fn connect(&self, buffer: usize) -> (ClientHandle, ClientFeed) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let handle = ClientHandle {
            id,
            tx,
            teardown: Arc::new(Teardown::new()),
        };
        (handle, ClientFeed { id, rx })
    }

    pub fn register(&self, handle: ClientHandle) {
        self.lock().insert(handle.id, handle);
    }

    /// Remove a client; absent ids are ignored. Returns whether it was present.
    pub fn unregister(&self, id: ClientId) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Point-in-time copy of the registered clients.
    pub fn snapshot_of_consumers(&self) -> Vec<ClientHandle> {
        self.lock().values().cloned().collect()
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, ClientHandle>> {
        self.clients.lock().unwrap_or_else(|e| e.into_inner())
    }
}
