//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::SourceError;
use crate::metrics::MetricSource;
use crate::types::{format_uptime, CpuStats, DiskStats, HostInfo, MemoryStats, Snapshot};

pub(crate) fn sample_snapshot() -> Snapshot {
    Snapshot {
        timestamp: time::OffsetDateTime::UNIX_EPOCH,
        cpu: CpuStats {
            usage_percent: 10.0,
            cores: 4,
        },
        memory: MemoryStats {
            total: 1_000,
            used: 250,
            available: 750,
            used_percent: 25.0,
        },
        disk: DiskStats {
            total: 2_000,
            used: 500,
            free: 1_500,
            used_percent: 25.0,
        },
        host: HostInfo {
            os: "linux".into(),
            platform: "test".into(),
            platform_version: "1".into(),
            hostname: "fake".into(),
        },
        uptime_secs: 3_665,
        uptime_human: format_uptime(3_665),
    }
}

/// Fixed values with switchable failures per metric group.
#[derive(Default)]
pub(crate) struct FakeSource {
    pub fail_cpu: AtomicBool,
    pub fail_disk: AtomicBool,
    pub fail_uptime: AtomicBool,
    pub fail_host: AtomicBool,
    pub cpu_calls: AtomicUsize,
}

impl MetricSource for FakeSource {
    fn cpu(&self) -> Result<CpuStats, SourceError> {
        self.cpu_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_cpu.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("cpu"));
        }
        Ok(sample_snapshot().cpu)
    }

    fn memory(&self) -> Result<MemoryStats, SourceError> {
        Ok(sample_snapshot().memory)
    }

    fn disk(&self) -> Result<DiskStats, SourceError> {
        if self.fail_disk.load(Ordering::SeqCst) {
            return Err(SourceError::NoMount("/".into()));
        }
        Ok(sample_snapshot().disk)
    }

    fn uptime(&self) -> Result<u64, SourceError> {
        if self.fail_uptime.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("uptime"));
        }
        Ok(sample_snapshot().uptime_secs)
    }

    fn host(&self) -> Result<HostInfo, SourceError> {
        if self.fail_host.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("hostname"));
        }
        Ok(sample_snapshot().host)
    }
}
