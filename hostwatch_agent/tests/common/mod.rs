//! Shared helpers: a scripted metric source and an agent on an ephemeral port.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hostwatch_agent::config::AgentConfig;
use hostwatch_agent::error::SourceError;
use hostwatch_agent::metrics::MetricSource;
use hostwatch_agent::types::{CpuStats, DiskStats, HostInfo, MemoryStats};
use tokio::net::TcpListener;

/// Deterministic source. `uptime` counts calls so every snapshot carries a
/// distinct sequence number.
#[derive(Default)]
pub struct ScriptedSource {
    pub fail_cpu: AtomicBool,
    seq: AtomicU64,
}

impl MetricSource for ScriptedSource {
    fn cpu(&self) -> Result<CpuStats, SourceError> {
        if self.fail_cpu.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("cpu"));
        }
        Ok(CpuStats {
            usage_percent: 42.5,
            cores: 8,
        })
    }

    fn memory(&self) -> Result<MemoryStats, SourceError> {
        Ok(MemoryStats {
            total: 16 << 30,
            used: 4 << 30,
            available: 12 << 30,
            used_percent: 25.0,
        })
    }

    fn disk(&self) -> Result<DiskStats, SourceError> {
        Ok(DiskStats {
            total: 512 << 30,
            used: 128 << 30,
            free: 384 << 30,
            used_percent: 25.0,
        })
    }

    fn uptime(&self) -> Result<u64, SourceError> {
        Ok(self.seq.fetch_add(1, Ordering::SeqCst))
    }

    fn host(&self) -> Result<HostInfo, SourceError> {
        Ok(HostInfo {
            os: "linux".into(),
            platform: "scripted".into(),
            platform_version: "1.0".into(),
            hostname: "test-host".into(),
        })
    }
}

pub async fn start_agent(source: Arc<ScriptedSource>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let config = AgentConfig {
        interval: Duration::from_millis(50),
        ..AgentConfig::default()
    };
    tokio::spawn(async move {
        let _ = hostwatch_agent::serve(listener, &config, source, std::future::pending()).await;
    });
    addr
}
