//! Metric sources. `SysinfoSource` reads the local host through sysinfo.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};
use tracing::debug;

use crate::error::SourceError;
use crate::types::{clamp_percent, percent_of, CpuStats, DiskStats, HostInfo, MemoryStats};

/// Synchronous provider of raw host metrics. Each call may fail on its own;
/// the sampler decides which failures are fatal for a snapshot.
pub trait MetricSource: Send + Sync + 'static {
    fn cpu(&self) -> Result<CpuStats, SourceError>;
    fn memory(&self) -> Result<MemoryStats, SourceError>;
    fn disk(&self) -> Result<DiskStats, SourceError>;
    fn uptime(&self) -> Result<u64, SourceError>;
    fn host(&self) -> Result<HostInfo, SourceError>;
}

/// Where the host root is mounted when the agent runs inside a container.
pub const HOST_ROOT_MOUNT: &str = "/hostfs";

pub fn default_disk_path() -> PathBuf {
    if Path::new(HOST_ROOT_MOUNT).exists() {
        PathBuf::from(HOST_ROOT_MOUNT)
    } else {
        PathBuf::from("/")
    }
}

struct SysState {
    sys: System,
    disks: Disks,
    // cpu usage is computed between two refreshes
    last_refresh: Instant,
}

pub struct SysinfoSource {
    state: Mutex<SysState>,
    disk_path: PathBuf,
}

impl SysinfoSource {
    pub fn new(disk_path: Option<PathBuf>) -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());
        let sys = System::new_with_specifics(refresh_kind);
        let disk_path = disk_path.unwrap_or_else(default_disk_path);
        debug!("sysinfo source ready, disk path {}", disk_path.display());
        Self {
            state: Mutex::new(SysState {
                sys,
                disks: Disks::new_with_refreshed_list(),
                last_refresh: Instant::now(),
            }),
            disk_path,
        }
    }

    pub fn disk_path(&self) -> &Path {
        &self.disk_path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SysState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Usage as seen by unprivileged users: space reserved for root counts as
/// used, so the percent reads higher than `df` on filesystems with reserved
/// blocks.
pub fn disk_stats(total: u64, available: u64) -> DiskStats {
    let free = available.min(total);
    let used = total - free;
    DiskStats {
        total,
        used,
        free,
        used_percent: percent_of(used, total),
    }
}

impl MetricSource for SysinfoSource {
    fn cpu(&self) -> Result<CpuStats, SourceError> {
        let mut st = self.lock();
        let since = st.last_refresh.elapsed();
        if since < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL {
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL - since);
        }
        st.sys.refresh_cpu_usage();
        st.last_refresh = Instant::now();

        let cores = st.sys.cpus().len();
        if cores == 0 {
            return Err(SourceError::Unavailable("cpu"));
        }
        Ok(CpuStats {
            usage_percent: clamp_percent(st.sys.global_cpu_usage() as f64),
            cores: cores as u32,
        })
    }

    fn memory(&self) -> Result<MemoryStats, SourceError> {
        let mut st = self.lock();
        st.sys.refresh_memory();
        let total = st.sys.total_memory();
        if total == 0 {
            return Err(SourceError::Unavailable("memory"));
        }
        let used = st.sys.used_memory();
        Ok(MemoryStats {
            total,
            used,
            available: st.sys.available_memory(),
            used_percent: percent_of(used, total),
        })
    }

    fn disk(&self) -> Result<DiskStats, SourceError> {
        let mut st = self.lock();
        // picks up mounts that appeared since the last sample
        st.disks.refresh(true);
        // The mount holding the path is the one with the longest matching mount point.
        let disk = st
            .disks
            .list()
            .iter()
            .filter(|d| self.disk_path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().components().count())
            .ok_or_else(|| SourceError::NoMount(self.disk_path.display().to_string()))?;

        Ok(disk_stats(disk.total_space(), disk.available_space()))
    }

    fn uptime(&self) -> Result<u64, SourceError> {
        Ok(System::uptime())
    }

    fn host(&self) -> Result<HostInfo, SourceError> {
        let hostname = hostname::get()?.to_string_lossy().into_owned();
        Ok(HostInfo {
            os: std::env::consts::OS.to_string(),
            platform: System::distribution_id(),
            platform_version: System::os_version().unwrap_or_default(),
            hostname,
        })
    }
}
