//! Error types for collection and the HTTP pull path.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Which part of a snapshot a metric source call was producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricGroup {
    Cpu,
    Memory,
    Disk,
    Uptime,
    Host,
}

impl MetricGroup {
    /// CPU, memory and disk are required; uptime and host are best-effort.
    pub fn is_load_bearing(self) -> bool {
        matches!(self, MetricGroup::Cpu | MetricGroup::Memory | MetricGroup::Disk)
    }
}

impl fmt::Display for MetricGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetricGroup::Cpu => "cpu",
            MetricGroup::Memory => "memory",
            MetricGroup::Disk => "disk",
            MetricGroup::Uptime => "uptime",
            MetricGroup::Host => "host",
        })
    }
}

/// A single metric source call failed.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0} not reported by the system")]
    Unavailable(&'static str),
    #[error("no filesystem mounted at {0}")]
    NoMount(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A snapshot could not be produced.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("{group} metrics unavailable: {source}")]
    Source {
        group: MetricGroup,
        #[source]
        source: SourceError,
    },
    #[error("{0} metrics were never collected")]
    Missing(MetricGroup),
    #[error("collection worker failed: {0}")]
    Worker(String),
}

/// Failures surfaced by the `/metrics` endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error("encoding snapshot: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Collection(e) => {
                error!("error collecting metrics: {e}");
                "Failed to collect metrics"
            }
            ApiError::Encoding(e) => {
                error!("error encoding metrics: {e}");
                "Failed to encode metrics"
            }
        };
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
