//! History replay: the dish DVR.
//!
//! The dish keeps the last `N` one-second samples of several quantities in
//! ring buffers. Each cycle the replayer fetches the rings, cuts one
//! chronological [`ReplayWindow`] per quantity and plays every window into
//! the sink at one value per second, so scrapers see a plausible live stream
//! delayed by one history interval instead of a burst.
//!
//! - [`ReplayWindow`]: pure ring-to-linear extraction
//! - [`replay`]: paced playback of one window
//! - [`HistoryReplayer`]: the collector tying both together

mod replayer;
mod window;

pub use replayer::{DEFAULT_INTERVAL, DEFAULT_TIMEOUT, HistoryReplayer, REPLAY_PACE, replay};
pub use window::ReplayWindow;
