use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::PollerConfig;
use crate::dashboard::SharedDashboard;
use crate::error::{DashboardError, Result};
use crate::snapshot::Snapshot;
use crate::source::SnapshotSource;

/// Point-in-time copy of the poller's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollCounts {
    pub started: u64,
    pub rendered: u64,
    pub failed: u64,
    pub skipped: u64,
}

#[derive(Debug, Default)]
struct PollStats {
    started: AtomicU64,
    rendered: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

struct Inner<S> {
    source: S,
    dashboard: SharedDashboard,
    config: PollerConfig,
    in_flight: Arc<AtomicUsize>,
    stats: PollStats,
}

/// Holds one slot of the in-flight count until the refresh task finishes or is aborted.
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Periodically pulls a snapshot from `S` and applies it to the dashboard.
pub struct Poller<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Poller<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SnapshotSource> Poller<S> {
    pub fn new(source: S, dashboard: SharedDashboard, config: PollerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                dashboard,
                config,
                in_flight: Arc::new(AtomicUsize::new(0)),
                stats: PollStats::default(),
            }),
        }
    }

    pub fn dashboard(&self) -> SharedDashboard {
        Arc::clone(&self.inner.dashboard)
    }

    pub fn config(&self) -> &PollerConfig {
        &self.inner.config
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    pub fn counts(&self) -> PollCounts {
        let stats = &self.inner.stats;
        PollCounts {
            started: stats.started.load(Ordering::Relaxed),
            rendered: stats.rendered.load(Ordering::Relaxed),
            failed: stats.failed.load(Ordering::Relaxed),
            skipped: stats.skipped.load(Ordering::Relaxed),
        }
    }

    /// Fetch one snapshot and, if it is valid, replace the dashboard contents.
    ///
    /// Nothing is touched on failure: the previous tables and chart value stay.
    pub async fn refresh(&self) -> Result<()> {
        let body = self.inner.source.fetch().await?;

        let snapshot = match Snapshot::parse(&body) {
            Ok(snapshot) => snapshot,
            Err(e @ DashboardError::Shape { .. }) => {
                tracing::error!(body = %body, "Invalid data structure");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        self.inner.dashboard.write().await.apply(&snapshot);

        tracing::info!(
            tasks = snapshot.tasks.len(),
            workers = snapshot.workers.len(),
            progress = snapshot.progress,
            "Dashboard refreshed"
        );
        Ok(())
    }

    /// One scheduled refresh. Errors end here: they are logged and counted.
    async fn refresh_cycle(&self) {
        self.inner.stats.started.fetch_add(1, Ordering::Relaxed);

        match self.refresh().await {
            Ok(()) => {
                self.inner.stats.rendered.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.inner.stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(kind = e.kind(), error = %e, "Error fetching data");
            }
        }
    }

    /// Start a refresh on `tasks`. Returns false if the in-flight guard skipped it.
    pub fn spawn_refresh(&self, tasks: &mut JoinSet<()>) -> bool {
        if self.inner.config.skip_overlapping && self.in_flight() > 0 {
            self.inner.stats.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Previous refresh still in flight, skipping tick");
            return false;
        }

        let guard = InFlightGuard::acquire(&self.inner.in_flight);
        let poller = self.clone();
        tasks.spawn(async move {
            let _guard = guard;
            poller.refresh_cycle().await
        });
        true
    }

    /// Refresh immediately, then on every interval tick until `shutdown` fires.
    ///
    /// Ticks do not wait for earlier refreshes unless `skip_overlapping` is set,
    /// so slow responses can overlap and the last one to complete is what stays
    /// on screen.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.inner.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tasks = JoinSet::new();

        tracing::info!(
            source = %self.inner.source.describe(),
            interval_ms = self.inner.config.interval_ms,
            skip_overlapping = self.inner.config.skip_overlapping,
            "Starting poller"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.spawn_refresh(&mut tasks);
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            tracing::error!(error = %e, "Refresh task panicked");
                        }
                    }
                }
            }
        }

        let outstanding = tasks.len();
        tasks.shutdown().await;
        tracing::info!(outstanding, "Poller stopped");
    }
}
