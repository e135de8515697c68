//! Bounded hand-off between the sampler, the dispatcher and each client.
//!
//! Both edges use the same policy: a single non-blocking attempt, and when
//! the buffer is full the newest snapshot is dropped. Producers never wait.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::types::Snapshot;

/// Outcome of a non-blocking offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Queued,
    /// Buffer full; the offered value was discarded.
    DroppedFull,
    /// Receiver is gone.
    Closed,
}

/// Try once to enqueue `value`, dropping it if the buffer is full.
pub fn offer_or_drop<T>(tx: &mpsc::Sender<T>, value: T) -> Offer {
    match tx.try_send(value) {
        Ok(()) => Offer::Queued,
        Err(TrySendError::Full(_)) => Offer::DroppedFull,
        Err(TrySendError::Closed(_)) => Offer::Closed,
    }
}

/// Producer side of the dispatch queue (owned by the periodic sampler).
#[derive(Clone)]
pub struct QueueProducer {
    tx: mpsc::Sender<Arc<Snapshot>>,
}

impl QueueProducer {
    pub fn offer(&self, snapshot: Arc<Snapshot>) -> Offer {
        offer_or_drop(&self.tx, snapshot)
    }
}

/// Create the dispatch queue. A zero capacity is raised to one.
pub fn dispatch_queue(capacity: usize) -> (QueueProducer, mpsc::Receiver<Arc<Snapshot>>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (QueueProducer { tx }, rx)
}
