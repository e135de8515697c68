//! WebSocket feed from the agent: connects, decodes pushed snapshots, and
//! reconnects after a fixed delay whenever the connection drops.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::types::Snapshot;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// What the feed task reports to the UI.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Connected,
    Snapshot(Box<Snapshot>),
    Disconnected(String),
}

// Connect to the agent and return the WS stream
pub async fn connect(url: &str) -> Result<WsStream, tokio_tungstenite::tungstenite::Error> {
    let (ws, _) = connect_async(url).await?;
    Ok(ws)
}

/// Decode a text frame; other frames carry no snapshot.
pub fn decode(msg: &Message) -> Option<Result<Snapshot, serde_json::Error>> {
    match msg {
        Message::Text(json) => Some(serde_json::from_str(json)),
        _ => None,
    }
}

/// Wait for the next snapshot on `ws`. Undecodable frames are skipped.
/// Returns `Err` with a reason once the connection is gone.
pub async fn next_snapshot(ws: &mut WsStream) -> Result<Snapshot, String> {
    while let Some(msg) = ws.next().await {
        let msg = msg.map_err(|e| e.to_string())?;
        if let Message::Close(_) = msg {
            return Err("closed by agent".into());
        }
        if let Some(Ok(snapshot)) = decode(&msg) {
            return Ok(snapshot);
        }
    }
    Err("connection ended".into())
}

/// Keep a connection to `url` alive until the receiver is dropped.
pub fn spawn_feed(url: String, tx: mpsc::Sender<FeedEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let reason = match connect(&url).await {
                Ok(mut ws) => {
                    if tx.send(FeedEvent::Connected).await.is_err() {
                        return;
                    }
                    loop {
                        match next_snapshot(&mut ws).await {
                            Ok(s) => {
                                if tx.send(FeedEvent::Snapshot(Box::new(s))).await.is_err() {
                                    return;
                                }
                            }
                            Err(reason) => break reason,
                        }
                    }
                }
                Err(e) => e.to_string(),
            };
            if tx.send(FeedEvent::Disconnected(reason)).await.is_err() {
                return;
            }
            sleep(RECONNECT_DELAY).await;
        }
    })
}
