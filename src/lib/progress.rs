//! Progress logging at fixed record intervals.

use log::info;

/// Logs a progress line each time the record count crosses a multiple of the interval.
///
/// Each pass over the input owns its own tracker, so the count is a plain integer.
///
/// ```
/// use ampclip_lib::progress::ProgressTracker;
///
/// let mut tracker = ProgressTracker::new("Transformed records").with_interval(100);
/// for _ in 0..250 {
///     tracker.record(1); // logs at 100 and 200
/// }
/// tracker.log_final(); // logs "Transformed records 250 (complete)"
/// assert_eq!(tracker.count(), 250);
/// ```
pub struct ProgressTracker {
    interval: u64,
    message: String,
    count: u64,
}

impl ProgressTracker {
    /// Creates a tracker with the given message prefix and an interval of 1,000,000.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { interval: 1_000_000, message: message.into(), count: 0 }
    }

    /// Sets the logging interval. An interval of zero is treated as one.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Adds `additional` records, logging once for every interval boundary crossed.
    pub fn record(&mut self, additional: u64) {
        let prev = self.count;
        self.count += additional;
        for i in (prev / self.interval + 1)..=(self.count / self.interval) {
            info!("{} {}", self.message, i * self.interval);
        }
    }

    /// Logs the final count unless the last `record` call already landed on a boundary.
    pub fn log_final(&self) {
        if self.count > 0 && self.count % self.interval != 0 {
            info!("{} {} (complete)", self.message, self.count);
        }
    }

    /// Number of records seen so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }
}
