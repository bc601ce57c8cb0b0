//! History replayer collector.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};

use crate::collector::history::ReplayWindow;
use crate::collector::{Collector, CollectorError, Schedule};
use crate::device::proto::{DishGetHistoryResponse, Request};
use crate::device::{DeviceClient, Target, call};
use crate::sink::catalog::{
    DISH_DOWNLINK_THROUGHPUT_BPS, DISH_POP_PING_DROP_RATE, DISH_POP_PING_LATENCY_MS, DISH_SNR,
    DISH_UPLINK_THROUGHPUT_BPS,
};
use crate::sink::{MetricSink, SinkError};

/// Default history interval (20 seconds).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(20);

/// Default `GetHistory` deadline (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The dish samples once per second, so replay does too.
pub const REPLAY_PACE: Duration = Duration::from_secs(1);

/// Tracked quantities and the gauge each one replays into.
fn tracked_series(history: &DishGetHistoryResponse) -> [(&'static str, &[f32]); 5] {
    [
        (DISH_POP_PING_LATENCY_MS, history.pop_ping_latency_ms.as_slice()),
        (DISH_POP_PING_DROP_RATE, history.pop_ping_drop_rate.as_slice()),
        (DISH_DOWNLINK_THROUGHPUT_BPS, history.downlink_throughput_bps.as_slice()),
        (DISH_UPLINK_THROUGHPUT_BPS, history.uplink_throughput_bps.as_slice()),
        (DISH_SNR, history.snr.as_slice()),
    ]
}

/// Play `window` into `metric`, one value per `pace`, oldest first.
///
/// The first value is written immediately, so a window of length `L` takes
/// `(L - 1) * pace`. Returns the number of values written.
pub async fn replay(
    window: ReplayWindow,
    metric: &'static str,
    sink: Arc<dyn MetricSink>,
    pace: Duration,
) -> Result<usize, SinkError> {
    let mut ticker = tokio::time::interval(pace);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut written = 0;
    for value in window {
        ticker.tick().await;
        sink.set_gauge(metric, value)?;
        written += 1;
    }
    Ok(written)
}

/// Fetches the dish history rings and replays them in real time.
///
/// One cycle: fetch, window every ring, replay all windows concurrently,
/// wait for the longest one, then idle until a full interval has passed
/// since the fetch. Replays never overlap with the next fetch.
pub struct HistoryReplayer {
    target: Target,
    schedule: Schedule,
    sink: Arc<dyn MetricSink>,
    pace: Duration,
}

impl HistoryReplayer {
    pub fn new(target: Target, schedule: Schedule, sink: Arc<dyn MetricSink>) -> Self {
        Self {
            target,
            schedule,
            sink,
            pace: REPLAY_PACE,
        }
    }

    /// Samples requested per cycle: whole seconds of the interval.
    pub fn samples_per_cycle(&self) -> i64 {
        i64::try_from(self.schedule.every().as_secs()).unwrap_or(i64::MAX)
    }

    /// Cut every tracked ring. Nothing is written here, so a malformed
    /// response never starts a partial replay.
    fn windows(&self, history: &DishGetHistoryResponse) -> Vec<(&'static str, ReplayWindow)> {
        let desired = self.samples_per_cycle();
        tracked_series(history)
            .into_iter()
            .map(|(metric, series)| {
                (
                    metric,
                    ReplayWindow::extract(series, history.current, desired),
                )
            })
            .collect()
    }
}

impl std::fmt::Debug for HistoryReplayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryReplayer")
            .field("target", &self.target)
            .field("schedule", &self.schedule)
            .field("pace", &self.pace)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Collector for HistoryReplayer {
    fn name(&self) -> &str {
        "dish_history"
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    async fn collect(&self, client: &mut dyn DeviceClient) -> Result<Duration, CollectorError> {
        let fetched_at = Instant::now();
        let response = call(client, Request::get_history(), self.schedule.timeout()).await?;
        let history = response
            .into_dish_get_history()
            .ok_or(CollectorError::UnexpectedResponse {
                method: "GetHistory",
            })?;

        let windows = self.windows(&history);
        let longest = windows.iter().map(|(_, w)| w.len()).max().unwrap_or(0);
        tracing::debug!(
            current = history.current,
            longest,
            "History fetched, starting replay"
        );

        let mut replays = JoinSet::new();
        for (metric, window) in windows {
            if window.is_empty() {
                continue;
            }
            replays.spawn(replay(window, metric, Arc::clone(&self.sink), self.pace));
        }

        let mut failure = None;
        while let Some(joined) = replays.join_next().await {
            match joined {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    failure.get_or_insert(CollectorError::Sink(e));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Replay task failed");
                    failure.get_or_insert(CollectorError::Replay(e.to_string()));
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        Ok(self.schedule.every().saturating_sub(fetched_at.elapsed()))
    }
}
