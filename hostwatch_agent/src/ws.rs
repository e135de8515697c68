//! WebSocket upgrade and per-connection handler. Each connection becomes a
//! `Session` that receives every snapshot the dispatcher fans out.

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Response},
};
use futures_util::stream::StreamExt;
use tracing::{debug, info, warn};

use crate::session::Session;
use crate::state::AppState;

pub async fn ws_handler(
    State(state): State<AppState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!("websocket upgrade rejected: {rejection}");
            return rejection.into_response();
        }
    };
    ws.on_failed_upgrade(|e| warn!("websocket upgrade error: {e}"))
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (session, feed) = Session::open(&state.registry, state.client_buffer);
    let id = session.id();
    info!(client = id, "new websocket connection, total clients: {}", state.registry.len());

    let initial = match state.sampler.sample().await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            debug!(client = id, "skipping initial metrics: {e}");
            None
        }
    };

    let (sink, stream) = socket.split();
    session.run(feed, sink, stream, initial).await;
    info!(client = id, "client disconnected, total clients: {}", state.registry.len());
}
