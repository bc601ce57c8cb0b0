//! Ring buffer windowing.

/// Chronologically ordered samples cut from one history ring.
///
/// The last sample is always the newest write at `current`; the first is
/// the oldest sample in the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayWindow {
    samples: Vec<f64>,
}

impl ReplayWindow {
    /// Cut the window for one ring.
    ///
    /// `current` is the position of the newest write in the device's logical
    /// sample stream; its ring slot is `current % N`. Devices that report a
    /// plain slot index (`current < N`) are the special case where no wrap
    /// has happened yet.
    ///
    /// The window length is `min(desired, N, current + 1)`, where a
    /// non-positive or oversized `desired` means the whole ring. Asking for
    /// more samples than the device has produced yields the shorter partial
    /// history. An empty ring yields an empty window.
    pub fn extract(series: &[f32], current: u64, desired: i64) -> Self {
        let capacity = series.len();
        if capacity == 0 {
            return Self::default();
        }

        let requested = match usize::try_from(desired) {
            Ok(wanted) if wanted > 0 && wanted <= capacity => wanted,
            _ => capacity,
        };
        let produced = current.saturating_add(1);
        let length = match usize::try_from(produced) {
            Ok(produced) => requested.min(produced),
            Err(_) => requested,
        };

        let newest = (current % capacity as u64) as usize;
        let oldest = (newest + capacity - (length - 1)) % capacity;
        let samples = (0..length)
            .map(|offset| f64::from(series[(oldest + offset) % capacity]))
            .collect();

        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples, oldest first.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}

impl IntoIterator for ReplayWindow {
    type Item = f64;
    type IntoIter = std::vec::IntoIter<f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}
