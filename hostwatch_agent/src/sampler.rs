//! Snapshot collection: the on-demand `Sampler::collect` used by `/metrics`
//! and new WebSocket clients, and the periodic driver feeding the dispatcher.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::{CollectionError, MetricGroup, SourceError};
use crate::metrics::MetricSource;
use crate::queue::{Offer, QueueProducer};
use crate::types::{
    clamp_percent, format_uptime, CpuStats, DiskStats, HostInfo, MemoryStats, Snapshot,
};

/// Assembles a snapshot from individual source results. Failures of
/// load-bearing groups are remembered and reported by `build`; uptime and
/// host failures leave their fields at defaults.
pub struct SnapshotBuilder {
    timestamp: OffsetDateTime,
    cpu: Option<CpuStats>,
    memory: Option<MemoryStats>,
    disk: Option<DiskStats>,
    host: HostInfo,
    uptime_secs: u64,
    failure: Option<(MetricGroup, SourceError)>,
}

impl SnapshotBuilder {
    pub fn new(timestamp: OffsetDateTime) -> Self {
        Self {
            timestamp,
            cpu: None,
            memory: None,
            disk: None,
            host: HostInfo::default(),
            uptime_secs: 0,
            failure: None,
        }
    }

    pub fn cpu(mut self, r: Result<CpuStats, SourceError>) -> Self {
        self.cpu = self.keep(MetricGroup::Cpu, r);
        self
    }

    pub fn memory(mut self, r: Result<MemoryStats, SourceError>) -> Self {
        self.memory = self.keep(MetricGroup::Memory, r);
        self
    }

    pub fn disk(mut self, r: Result<DiskStats, SourceError>) -> Self {
        self.disk = self.keep(MetricGroup::Disk, r);
        self
    }

    pub fn uptime(mut self, r: Result<u64, SourceError>) -> Self {
        self.uptime_secs = self.keep(MetricGroup::Uptime, r).unwrap_or_default();
        self
    }

    pub fn host(mut self, r: Result<HostInfo, SourceError>) -> Self {
        self.host = self.keep(MetricGroup::Host, r).unwrap_or_default();
        self
    }

    fn keep<T>(&mut self, group: MetricGroup, r: Result<T, SourceError>) -> Option<T> {
        match r {
            Ok(v) => Some(v),
            Err(e) if group.is_load_bearing() => {
                // first failure wins
                if self.failure.is_none() {
                    self.failure = Some((group, e));
                }
                None
            }
            Err(e) => {
                debug!("{group} lookup failed, leaving defaults: {e}");
                None
            }
        }
    }

    pub fn build(self) -> Result<Snapshot, CollectionError> {
        if let Some((group, source)) = self.failure {
            return Err(CollectionError::Source { group, source });
        }
        let mut cpu = self.cpu.ok_or(CollectionError::Missing(MetricGroup::Cpu))?;
        let mut memory = self.memory.ok_or(CollectionError::Missing(MetricGroup::Memory))?;
        let mut disk = self.disk.ok_or(CollectionError::Missing(MetricGroup::Disk))?;
        cpu.usage_percent = clamp_percent(cpu.usage_percent);
        memory.used_percent = clamp_percent(memory.used_percent);
        disk.used_percent = clamp_percent(disk.used_percent);

        Ok(Snapshot {
            timestamp: self.timestamp,
            cpu,
            memory,
            disk,
            host: self.host,
            uptime_secs: self.uptime_secs,
            uptime_human: format_uptime(self.uptime_secs),
        })
    }
}

/// Produces snapshots from a metric source. Cheap to clone.
#[derive(Clone)]
pub struct Sampler {
    source: Arc<dyn MetricSource>,
}

impl Sampler {
    pub fn new(source: Arc<dyn MetricSource>) -> Self {
        Self { source }
    }

    /// Blocking collection of one snapshot.
    pub fn collect(&self) -> Result<Snapshot, CollectionError> {
        let src = &self.source;
        SnapshotBuilder::new(OffsetDateTime::now_utc())
            .cpu(src.cpu())
            .memory(src.memory())
            .disk(src.disk())
            .uptime(src.uptime())
            .host(src.host())
            .build()
    }

    /// `collect` on the blocking pool, for async callers.
    pub async fn sample(&self) -> Result<Snapshot, CollectionError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.collect())
            .await
            .map_err(|e| CollectionError::Worker(e.to_string()))?
    }
}

/// Collect every `period` and offer the result to the dispatch queue.
/// A failed tick is logged and skipped; a full queue drops the snapshot.
pub fn spawn_sampler(sampler: Sampler, period: Duration, queue: QueueProducer) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let snapshot = match sampler.sample().await {
                Ok(s) => Arc::new(s),
                Err(e) => {
                    warn!("error collecting metrics: {e}");
                    continue;
                }
            };
            match queue.offer(snapshot) {
                Offer::Queued => {}
                Offer::DroppedFull => debug!("dispatch queue full, dropping snapshot"),
                Offer::Closed => {
                    debug!("dispatch queue closed, sampler exiting");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::dispatch_queue;
    use crate::testing::{sample_snapshot, FakeSource};
    use std::sync::atomic::Ordering;

    #[test]
    fn best_effort_groups_default_on_failure() {
        let src = FakeSource::default();
        src.fail_uptime.store(true, Ordering::SeqCst);
        src.fail_host.store(true, Ordering::SeqCst);
        let snap = Sampler::new(Arc::new(src)).collect().expect("collect");
        assert_eq!(snap.uptime_secs, 0);
        assert_eq!(snap.uptime_human, "0s");
        assert_eq!(snap.host, HostInfo::default());
        assert_eq!(snap.cpu, sample_snapshot().cpu);
    }

    #[test]
    fn load_bearing_failure_fails_collection() {
        let src = FakeSource::default();
        src.fail_disk.store(true, Ordering::SeqCst);
        let err = Sampler::new(Arc::new(src)).collect().unwrap_err();
        assert!(matches!(
            err,
            CollectionError::Source {
                group: MetricGroup::Disk,
                ..
            }
        ));
    }

    #[test]
    fn first_load_bearing_failure_is_reported() {
        let err = SnapshotBuilder::new(OffsetDateTime::UNIX_EPOCH)
            .cpu(Err(SourceError::Unavailable("cpu")))
            .memory(Ok(MemoryStats::default()))
            .disk(Err(SourceError::NoMount("/".into())))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CollectionError::Source {
                group: MetricGroup::Cpu,
                ..
            }
        ));
    }

    #[test]
    fn builder_clamps_percentages() {
        let snap = SnapshotBuilder::new(OffsetDateTime::UNIX_EPOCH)
            .cpu(Ok(CpuStats {
                usage_percent: 130.0,
                cores: 2,
            }))
            .memory(Ok(MemoryStats {
                used_percent: -1.0,
                ..MemoryStats::default()
            }))
            .disk(Ok(DiskStats {
                used_percent: f64::NAN,
                ..DiskStats::default()
            }))
            .uptime(Ok(90_065))
            .build()
            .expect("build");
        assert_eq!(snap.cpu.usage_percent, 100.0);
        assert_eq!(snap.memory.used_percent, 0.0);
        assert_eq!(snap.disk.used_percent, 0.0);
        assert_eq!(snap.uptime_human, "1d 1h 1m");
    }

    #[tokio::test]
    async fn driver_keeps_ticking_when_queue_is_full() {
        let src = Arc::new(FakeSource::default());
        let (producer, rx) = dispatch_queue(1);
        let task = spawn_sampler(
            Sampler::new(src.clone()),
            Duration::from_millis(10),
            producer,
        );
        // Nobody drains the queue: only the first snapshot fits.
        tokio::time::sleep(Duration::from_millis(200)).await;
        task.abort();
        assert!(src.cpu_calls.load(Ordering::SeqCst) >= 5);
        assert_eq!(rx.len(), 1);
    }

    #[tokio::test]
    async fn driver_skips_failed_ticks() {
        let src = Arc::new(FakeSource::default());
        src.fail_cpu.store(true, Ordering::SeqCst);
        let (producer, mut rx) = dispatch_queue(4);
        let task = spawn_sampler(
            Sampler::new(src.clone()),
            Duration::from_millis(10),
            producer,
        );
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(rx.try_recv().is_err());

        src.fail_cpu.store(false, Ordering::SeqCst);
        let next = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        task.abort();
        assert!(matches!(next, Ok(Some(_))));
    }
}
