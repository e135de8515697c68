//! Per-client session: registration, the initial snapshot, and the two
//! duties that run while the client is active (push forwarder and read
//! watcher). Either duty failing tears the session down exactly once.

use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::registry::{ClientFeed, ClientHandle, ClientId, Registry};
use crate::types::Snapshot;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("encoding snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("writing frame: {0}")]
    Transport(String),
}

#[derive(Clone)]
pub struct Session {
    handle: ClientHandle,
    registry: Arc<Registry>,
}

impl Session {
    /// Allocate and register a client with a `buffer`-deep outgoing queue.
    pub fn open(registry: &Arc<Registry>, buffer: usize) -> (Self, ClientFeed) {
        let (handle, feed) = registry.connect(buffer);
        registry.register(handle.clone());
        let session = Self {
            handle,
            registry: Arc::clone(registry),
        };
        (session, feed)
    }

    pub fn id(&self) -> ClientId {
        self.handle.id()
    }

    /// Unregister and signal both duties to stop. Idempotent.
    pub fn close(&self) -> bool {
        self.handle.close(&self.registry)
    }

    pub fn is_closed(&self) -> bool {
        self.handle.teardown().is_fired()
    }

    pub async fn closed(&self) {
        self.handle.teardown().fired().await
    }

    /// Drive the session until either side fails. `initial` is written
    /// before anything the dispatcher queued for this client.
    pub async fn run<S, R, E>(
        self,
        feed: ClientFeed,
        mut sink: S,
        stream: R,
        initial: Option<Snapshot>,
    ) where
        S: Sink<Message> + Unpin + Send + 'static,
        S::Error: Display,
        R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        if let Some(snapshot) = initial {
            if let Err(e) = send_snapshot(&mut sink, &snapshot).await {
                debug!(client = self.id(), "error sending initial metrics: {e}");
                self.close();
            }
        }

        let forwarder = tokio::spawn(forward(sink, feed.rx, self.clone()));
        let watcher = tokio::spawn(watch_reads(stream, self.clone()));
        let _ = tokio::join!(forwarder, watcher);
        // a panicked duty must not leave the client registered
        self.close();
    }
}

pub async fn send_snapshot<S>(sink: &mut S, snapshot: &Snapshot) -> Result<(), PushError>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let json = serde_json::to_string(snapshot)?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| PushError::Transport(e.to_string()))
}

/// Write every snapshot the dispatcher queues for this client.
async fn forward<S>(mut sink: S, mut rx: mpsc::Receiver<Arc<Snapshot>>, session: Session)
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    loop {
        tokio::select! {
            _ = session.closed() => break,
            next = rx.recv() => {
                let Some(snapshot) = next else {
                    session.close();
                    break;
                };
                if let Err(e) = send_snapshot(&mut sink, &snapshot).await {
                    debug!(client = session.id(), "websocket write error: {e}");
                    session.close();
                    break;
                }
            }
        }
    }
    let _ = sink.close().await;
}

/// Read and discard inbound frames; any error, Close frame or end of stream
/// means the client is gone.
async fn watch_reads<R, E>(mut stream: R, session: Session)
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        tokio::select! {
            _ = session.closed() => break,
            msg = stream.next() => match msg {
                Some(Ok(Message::Close(_))) | None => {
                    session.close();
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(client = session.id(), "websocket read error: {e}");
                    session.close();
                    break;
                }
            }
        }
    }
}
