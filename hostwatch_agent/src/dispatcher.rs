//! Fan-out of each sampled snapshot to every registered client.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::queue::Offer;
use crate::registry::Registry;
use crate::types::Snapshot;

/// Per-dispatch tally, mostly for logs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    /// Client buffer was full; that client skips this snapshot.
    pub dropped: usize,
    /// Client was gone; it has been closed and unregistered.
    pub failed: usize,
}

pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Offer `snapshot` to each client registered right now. A failing client
    /// is closed and removed; the others are unaffected.
    pub fn dispatch(&self, snapshot: &Arc<Snapshot>) -> DispatchReport {
        let mut report = DispatchReport::default();
        for client in self.registry.snapshot_of_consumers() {
            match client.push(Arc::clone(snapshot)) {
                Offer::Queued => report.delivered += 1,
                Offer::DroppedFull => {
                    debug!(client = client.id(), "client buffer full, dropping snapshot");
                    report.dropped += 1;
                }
                Offer::Closed => {
                    debug!(client = client.id(), "client gone, unregistering");
                    client.close(&self.registry);
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Drain the dispatch queue until the sampler side goes away.
    pub async fn run(self, mut queue: mpsc::Receiver<Arc<Snapshot>>) {
        while let Some(snapshot) = queue.recv().await {
            let report = self.dispatch(&snapshot);
            if report.dropped + report.failed > 0 {
                debug!(?report, "dispatch finished with misses");
            }
        }
    }
}

pub fn spawn_dispatcher(
    dispatcher: Dispatcher,
    queue: mpsc::Receiver<Arc<Snapshot>>,
) -> JoinHandle<()> {
    tokio::spawn(dispatcher.run(queue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::dispatch_queue;
    use crate::testing::sample_snapshot;
    use std::time::Duration;

    #[test]
    fn every_registered_client_gets_one_copy() {
        let reg = Arc::new(Registry::new());
        let mut feeds = Vec::new();
        for _ in 0..3 {
            let (h, f) = reg.connect(4);
            reg.register(h);
            feeds.push(f);
        }
        let snap = Arc::new(sample_snapshot());
        let report = Dispatcher::new(reg.clone()).dispatch(&snap);
        assert_eq!(report.delivered, 3);

        for f in feeds.iter_mut() {
            let got = f.rx.try_recv().expect("delivered");
            assert!(Arc::ptr_eq(&got, &snap));
            assert!(f.rx.try_recv().is_err());
        }
    }

    #[test]
    fn dead_client_is_removed_and_others_still_served() {
        let reg = Arc::new(Registry::new());
        let (alive_a, mut feed_a) = reg.connect(4);
        let (dead, feed_dead) = reg.connect(4);
        let (alive_b, mut feed_b) = reg.connect(4);
        reg.register(alive_a);
        reg.register(dead.clone());
        reg.register(alive_b);
        drop(feed_dead);

        let dispatcher = Dispatcher::new(reg.clone());
        let report = dispatcher.dispatch(&Arc::new(sample_snapshot()));
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        assert!(!reg.contains(dead.id()));
        assert!(dead.teardown().is_fired());
        assert!(feed_a.rx.try_recv().is_ok());
        assert!(feed_b.rx.try_recv().is_ok());

        // Already gone: the next dispatch does not see it again.
        let report = dispatcher.dispatch(&Arc::new(sample_snapshot()));
        assert_eq!(report.failed, 0);
        assert_eq!(report.delivered, 2);
    }

    #[test]
    fn slow_client_drops_without_blocking_others() {
        let reg = Arc::new(Registry::new());
        let (slow, mut slow_feed) = reg.connect(1);
        let (fast, fast_feed) = reg.connect(8);
        reg.register(slow);
        reg.register(fast);
        let dispatcher = Dispatcher::new(reg.clone());

        let first = Arc::new(sample_snapshot());
        dispatcher.dispatch(&first);
        let report = dispatcher.dispatch(&Arc::new(sample_snapshot()));
        assert_eq!(report.dropped, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(reg.len(), 2);

        // The slow client kept the older snapshot.
        assert!(Arc::ptr_eq(&slow_feed.rx.try_recv().unwrap(), &first));
        assert!(slow_feed.rx.try_recv().is_err());
        assert_eq!(fast_feed.rx.len(), 2);
    }

    #[tokio::test]
    async fn run_preserves_production_order() {
        let reg = Arc::new(Registry::new());
        let (h, mut feed) = reg.connect(8);
        reg.register(h);
        let (producer, queue) = dispatch_queue(8);
        let task = spawn_dispatcher(Dispatcher::new(reg.clone()), queue);

        for secs in [1u64, 2, 3] {
            let mut s = sample_snapshot();
            s.uptime_secs = secs;
            producer.offer(Arc::new(s));
        }
        let mut seen = Vec::new();
        for _ in 0..3 {
            let s = tokio::time::timeout(Duration::from_secs(1), feed.rx.recv())
                .await
                .expect("in time")
                .expect("open");
            seen.push(s.uptime_secs);
        }
        task.abort();
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
