//! Collector registry for managing collector lifecycle.
//!
//! Every collector runs in its own Tokio task:
//!
//! ```text
//! Connecting --dial ok--> Polling --collect ok--> Disconnected --idle(pause)--> Connecting
//!     |                      |
//!     +--dial err------------+--collect err--> BackingOff --idle(retry)--> Connecting
//! ```
//!
//! Failures retry the same step after a fixed delay, with no backoff growth
//! and no retry ceiling. Tasks share nothing but the metric sink.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::collector::{Collector, CollectorError, CollectorState};
use crate::device::Dialer;
use crate::sink::catalog::COLLECTOR_UP;
use crate::sink::{MetricPoint, MetricSink};

/// Default timeout for graceful shutdown (5 seconds).
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default delay before retrying a failed dial or RPC (2 seconds).
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// Cooperative stop signal observed by every collector task.
#[derive(Debug, Clone)]
pub struct ShutdownSignal(watch::Receiver<bool>);

impl ShutdownSignal {
    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolve once shutdown is requested or the registry is gone.
    pub async fn triggered(&mut self) {
        let _ = self.0.wait_for(|stop| *stop).await;
    }

    /// Idle for `duration` on the monotonic clock.
    ///
    /// Durations past the clock's range sleep until shutdown. Returns
    /// `false` if shutdown arrived first.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.triggered() => false,
        }
    }

    /// Drive `future` to completion unless shutdown arrives first.
    pub async fn guard<F: Future>(&mut self, future: F) -> Option<F::Output> {
        tokio::select! {
            output = future => Some(output),
            _ = self.triggered() => None,
        }
    }
}

/// Registry for managing multiple collector tasks.
pub struct CollectorRegistry {
    dialer: Arc<dyn Dialer>,
    sink: Arc<dyn MetricSink>,
    retry_interval: Duration,
    shutdown: watch::Sender<bool>,
    tasks: Mutex<JoinSet<()>>,
    jobs: RwLock<HashSet<String>>,
}

impl CollectorRegistry {
    /// Create a new collector registry.
    pub fn new(dialer: Arc<dyn Dialer>, sink: Arc<dyn MetricSink>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            dialer,
            sink,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            shutdown,
            tasks: Mutex::new(JoinSet::new()),
            jobs: RwLock::new(HashSet::new()),
        }
    }

    /// Set the delay applied after any failed dial or RPC.
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }
}

impl std::fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("retry_interval", &self.retry_interval)
            .field(
                "job_count",
                &self.jobs.try_read().map(|j| j.len()).unwrap_or(0),
            )
            .finish_non_exhaustive()
    }
}

impl CollectorRegistry {
    /// Register a collector and start its task immediately.
    ///
    /// # Errors
    /// Returns `CollectorError::Config` if a collector with the same name is
    /// already registered.
    pub async fn spawn<C: Collector>(&self, collector: C) -> Result<(), CollectorError> {
        let name = collector.name().to_string();
        {
            let mut jobs = self.jobs.write().await;
            if !jobs.insert(name.clone()) {
                return Err(CollectorError::Config(format!(
                    "collector '{name}' is already registered"
                )));
            }
        }

        tracing::info!(
            collector = %name,
            target = %collector.target(),
            schedule = %collector.schedule(),
            "Collector registered"
        );

        let worker = Worker {
            collector: Arc::new(collector),
            dialer: Arc::clone(&self.dialer),
            sink: Arc::clone(&self.sink),
            retry_interval: self.retry_interval,
        };
        let shutdown = ShutdownSignal(self.shutdown.subscribe());
        self.tasks.lock().await.spawn(worker.run(shutdown));
        Ok(())
    }

    /// Get the number of registered collectors.
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Gracefully stop every collector with the default timeout.
    pub async fn shutdown(self) {
        self.shutdown_with_timeout(DEFAULT_SHUTDOWN_TIMEOUT).await
    }

    /// Signal every task to stop and wait up to `timeout` for them.
    ///
    /// Tasks still running after the timeout are aborted.
    pub async fn shutdown_with_timeout(self, timeout: Duration) {
        let job_count = self.jobs.read().await.len();
        self.shutdown.send_replace(true);

        let mut tasks = self.tasks.into_inner();
        let drained = tokio::time::timeout(timeout, async {
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    tracing::warn!(error = %e, "Collector task ended abnormally");
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(job_count, "Collector shutdown timed out, aborting remaining tasks");
            tasks.shutdown().await;
        } else {
            tracing::info!(job_count, "Collector shutdown complete");
        }
    }
}

/// Everything one collector task owns.
struct Worker<C> {
    collector: Arc<C>,
    dialer: Arc<dyn Dialer>,
    sink: Arc<dyn MetricSink>,
    retry_interval: Duration,
}

impl<C: Collector> Worker<C> {
    async fn run(self, mut shutdown: ShutdownSignal) {
        let name = self.collector.name().to_string();
        let mut state = CollectorState::Disconnected;

        while !shutdown.is_triggered() {
            let Some(result) = shutdown.guard(self.cycle(&name, &mut state)).await else {
                break;
            };

            let pause = match result {
                Ok(pause) => {
                    state.advance(CollectorState::Disconnected, &name);
                    self.mark_up(&name, true);
                    pause
                }
                Err(e) => {
                    tracing::warn!(
                        collector = %name,
                        error = %e,
                        retry_in = ?self.retry_interval,
                        "Collection failed"
                    );
                    state.advance(CollectorState::BackingOff, &name);
                    self.mark_up(&name, false);
                    self.retry_interval
                }
            };

            if !shutdown.sleep(pause).await {
                break;
            }
        }

        tracing::info!(collector = %name, "Collector stopped");
    }

    /// Dial, collect once, drop the connection.
    async fn cycle(
        &self,
        name: &str,
        state: &mut CollectorState,
    ) -> Result<Duration, CollectorError> {
        state.advance(CollectorState::Connecting, name);
        let mut client = self.dialer.dial(self.collector.target(), None).await?;

        state.advance(CollectorState::Polling, name);
        let start = Instant::now();
        let pause = self.collector.collect(client.as_mut()).await?;
        tracing::debug!(
            collector = %name,
            duration_ms = start.elapsed().as_millis() as u64,
            next_in = ?pause,
            "Collection succeeded"
        );
        Ok(pause)
    }

    fn mark_up(&self, name: &str, up: bool) {
        let point = MetricPoint::gauge(COLLECTOR_UP, crate::sink::bool_value(up))
            .with_label("collector", name);
        if let Err(e) = self.sink.record(&point) {
            tracing::warn!(collector = %name, error = %e, "Failed to record collector status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Schedule;
    use crate::collector::testing::FakeDialer;
    use crate::device::proto::{self, GetPingResponse};
    use crate::device::{DeviceClient, Role, Target, call};
    use crate::sink::testing::RecordingSink;

    /// Writes three points per successful cycle.
    struct MockCollector {
        name: String,
        target: Target,
        schedule: Schedule,
        sink: Arc<RecordingSink>,
    }

    impl MockCollector {
        fn new(name: &str, sink: Arc<RecordingSink>) -> Self {
            Self {
                name: name.to_string(),
                target: Target::new(Role::Wifi, "127.0.0.1:9000").unwrap(),
                schedule: Schedule::interval(Duration::from_secs(60)),
                sink,
            }
        }
    }

    #[async_trait::async_trait]
    impl Collector for MockCollector {
        fn name(&self) -> &str {
            &self.name
        }

        fn target(&self) -> &Target {
            &self.target
        }

        fn schedule(&self) -> &Schedule {
            &self.schedule
        }

        async fn collect(
            &self,
            client: &mut dyn DeviceClient,
        ) -> Result<Duration, CollectorError> {
            let response = call(client, proto::Request::get_ping(), self.schedule.timeout()).await?;
            response
                .into_get_ping()
                .ok_or(CollectorError::UnexpectedResponse { method: "GetPing" })?;
            self.sink.record_all(&[
                MetricPoint::gauge("a", 1.0),
                MetricPoint::gauge("b", 2.0),
                MetricPoint::gauge("c", 3.0),
            ])?;
            Ok(self.schedule.every())
        }
    }

    fn ping_dialer() -> FakeDialer {
        FakeDialer::new(|_| Ok(proto::Response::get_ping(GetPingResponse::default())))
    }

    fn up_values(sink: &RecordingSink) -> Vec<f64> {
        sink.values(COLLECTOR_UP)
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_lifecycle() {
        let sink = Arc::new(RecordingSink::default());
        let registry = CollectorRegistry::new(Arc::new(ping_dialer()), sink.clone());

        registry
            .spawn(MockCollector::new("mock", sink.clone()))
            .await
            .unwrap();
        registry
            .spawn(MockCollector::new("other", sink.clone()))
            .await
            .unwrap();
        assert_eq!(registry.job_count().await, 2);

        let err = registry
            .spawn(MockCollector::new("mock", sink.clone()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
        assert_eq!(registry.job_count().await, 2);

        registry.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_in_place_then_single_complete_write() {
        let sink = Arc::new(RecordingSink::default());
        let dialer = Arc::new(ping_dialer().failing_first(3));
        let registry = CollectorRegistry::new(dialer.clone(), sink.clone());
        registry
            .spawn(MockCollector::new("mock", sink.clone()))
            .await
            .unwrap();

        // Three failed dials at t=0,2,4 then a success at t=6.
        tokio::time::sleep(Duration::from_secs(7)).await;

        assert_eq!(dialer.dials(), 4);
        assert_eq!(sink.values("a"), vec![1.0]);
        assert_eq!(sink.values("b"), vec![2.0]);
        assert_eq!(sink.values("c"), vec![3.0]);
        assert_eq!(up_values(&sink), vec![0.0, 0.0, 0.0, 1.0]);

        // Next cycle only after the full interval.
        tokio::time::sleep(Duration::from_secs(58)).await;
        assert_eq!(dialer.dials(), 4);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(dialer.dials(), 5);
        assert_eq!(sink.values("a"), vec![1.0, 1.0]);

        registry.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rpc_failure_writes_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let dialer = Arc::new(FakeDialer::new(|_| {
            Err(tonic::Status::unavailable("dish rebooting"))
        }));
        let registry = CollectorRegistry::new(dialer.clone(), sink.clone())
            .with_retry_interval(Duration::from_secs(2));
        registry
            .spawn(MockCollector::new("mock", sink.clone()))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(dialer.dials(), 3);
        assert!(sink.values("a").is_empty());
        assert_eq!(up_values(&sink), vec![0.0, 0.0, 0.0]);

        registry.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_idle() {
        let sink = Arc::new(RecordingSink::default());
        let registry = CollectorRegistry::new(Arc::new(ping_dialer()), sink.clone());
        registry
            .spawn(MockCollector::new("mock", sink.clone()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let started = Instant::now();
        registry.shutdown().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_shutdown_signal_sleep() {
        let (tx, rx) = watch::channel(false);
        let mut signal = ShutdownSignal(rx);
        assert!(signal.sleep(Duration::from_millis(1)).await);

        tx.send_replace(true);
        assert!(signal.is_triggered());
        assert!(!signal.sleep(Duration::from_secs(3600)).await);
        assert!(signal.guard(std::future::pending::<()>()).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_signal_sleep_beyond_clock_range() {
        let (tx, rx) = watch::channel(false);
        let mut signal = ShutdownSignal(rx);

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            tx.send_replace(true);
            tx
        });

        // ~300 billion years; must not overflow the deadline.
        let huge = Duration::from_secs(300_000_000_000 * 31_557_600);
        assert!(!signal.sleep(huge).await);
        drop(stopper.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_collector_idles_until_shutdown() {
        let sink = Arc::new(RecordingSink::default());
        let dialer = Arc::new(ping_dialer());
        let registry = CollectorRegistry::new(dialer.clone(), sink.clone());
        let mut collector = MockCollector::new("mock", sink.clone());
        collector.schedule = Schedule::interval(Duration::MAX);
        registry.spawn(collector).await.unwrap();

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(dialer.dials(), 1);
        assert_eq!(up_values(&sink), vec![1.0]);

        registry.shutdown().await;
    }
}
