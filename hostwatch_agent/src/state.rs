//! Shared agent state handed to every request handler.

use std::sync::Arc;

use crate::registry::Registry;
use crate::sampler::Sampler;

#[derive(Clone)]
pub struct AppState {
    pub sampler: Sampler,
    pub registry: Arc<Registry>,
    // per-client outgoing buffer depth
    pub client_buffer: usize,
}
