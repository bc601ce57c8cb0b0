//! Restart watchdog.
//!
//! The exporter asks its supervisor for a restart after a fixed uptime. The
//! deadline is measured on the monotonic clock so wall-clock jumps never
//! shorten or extend it.

use std::time::Duration;

use tokio::time::Instant;

/// Default uptime before a restart is requested (1 hour).
pub const DEFAULT_RESTART_AFTER: Duration = Duration::from_secs(60 * 60);

/// Stand-in deadline for periods past the clock's range (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Process exit code used to ask the supervisor for a restart (`EX_TEMPFAIL`).
pub const RESTART_EXIT_CODE: i32 = 75;

/// Returned when the watchdog deadline has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("restart requested after {}", humantime::format_duration(*.after))]
pub struct RestartRequested {
    pub after: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct Watchdog {
    after: Duration,
    deadline: Instant,
}

impl Watchdog {
    /// Arm the watchdog now.
    ///
    /// A period too long for the monotonic clock is capped to a deadline
    /// decades away.
    pub fn start(after: Duration) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(after)
            .unwrap_or_else(|| now + FAR_FUTURE.min(after));
        Self { after, deadline }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Resolve once the deadline has passed.
    pub async fn expired(self) -> RestartRequested {
        tokio::time::sleep_until(self.deadline).await;
        RestartRequested { after: self.after }
    }
}
