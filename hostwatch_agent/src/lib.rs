//! hostwatch_agent: samples host metrics on a fixed period and serves them
//! as a one-shot `/metrics` document and a WebSocket push stream.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod metrics;
pub mod queue;
pub mod registry;
pub mod sampler;
pub mod session;
pub mod state;
pub mod types;
pub mod ws;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::AgentConfig;
use crate::dispatcher::{spawn_dispatcher, Dispatcher};
use crate::metrics::MetricSource;
use crate::queue::dispatch_queue;
use crate::registry::Registry;
use crate::sampler::{spawn_sampler, Sampler};
use crate::state::AppState;

/// Run the whole agent on `listener` until `shutdown` resolves: periodic
/// sampler, dispatcher, and the HTTP/WebSocket server.
pub async fn serve<F>(
    listener: TcpListener,
    config: &AgentConfig,
    source: Arc<dyn MetricSource>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let sampler = Sampler::new(source);
    let registry = Arc::new(Registry::new());

    let (producer, queue) = dispatch_queue(config.queue_capacity);
    let dispatcher = spawn_dispatcher(Dispatcher::new(Arc::clone(&registry)), queue);
    let periodic = spawn_sampler(sampler.clone(), config.interval, producer);
    info!(
        "sampling every {}ms, queue depth {}, client buffer {}",
        config.interval.as_millis(),
        config.queue_capacity,
        config.client_buffer
    );

    let app = http::router(AppState {
        sampler,
        registry,
        client_buffer: config.client_buffer,
    });
    let res = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    periodic.abort();
    dispatcher.abort();
    res
}
