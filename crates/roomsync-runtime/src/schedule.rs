//! Accumulator-driven broadcast schedule.
//!
//! The host's periodic sync is modeled as an explicit repeating task owned
//! by the runtime instance rather than an ambient timer: callers feed
//! elapsed wall time into [`SyncSchedule::accumulate`] and act when it
//! reports due intervals. Teardown is deterministic because the schedule
//! dies with the runtime.

/// Fixed-interval schedule for the host's sync broadcast.
#[derive(Debug, Clone)]
pub struct SyncSchedule {
    interval_ms: u64,
    accumulator_ms: u64,
    total_intervals: u64,
}

impl SyncSchedule {
    /// Create a schedule firing every `interval_ms` milliseconds.
    /// An interval of zero is clamped to one.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            accumulator_ms: 0,
            total_intervals: 0,
        }
    }

    /// Feed elapsed time; returns how many whole intervals became due.
    ///
    /// Several due intervals in one call usually collapse into a single
    /// broadcast downstream, since a state diff is cumulative.
    pub fn accumulate(&mut self, elapsed_ms: u64) -> u64 {
        self.accumulator_ms += elapsed_ms;
        let due = self.accumulator_ms / self.interval_ms;
        self.accumulator_ms %= self.interval_ms;
        self.total_intervals += due;
        due
    }

    /// Total intervals reported due since creation.
    pub fn total_intervals(&self) -> u64 {
        self.total_intervals
    }

    /// The configured interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}
