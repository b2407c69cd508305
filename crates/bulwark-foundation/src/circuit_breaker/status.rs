//! Rolling health counters for one protected capability.

use std::collections::VecDeque;
use tokio::time::Instant;

/// Number of latency samples kept for averaging
pub const DEFAULT_LATENCY_WINDOW: usize = 100;

/// Success/failure counters and a bounded latency window.
///
/// The counters drive the breaker's opening decision; the latency window is
/// only reported. Not synchronized on its own: the owning
/// [`CircuitBreaker`](super::CircuitBreaker) keeps it behind its lock.
#[derive(Debug, Clone)]
pub struct ComponentStatus {
    successes: u64,
    failures: u64,
    response_times_ms: VecDeque<f64>,
    capacity: usize,
    last_success_time: Option<Instant>,
    last_failure_time: Option<Instant>,
}

impl ComponentStatus {
    /// Create an empty status with the default latency window
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LATENCY_WINDOW)
    }

    /// Create an empty status keeping at most `capacity` latency samples
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            successes: 0,
            failures: 0,
            response_times_ms: VecDeque::with_capacity(capacity),
            capacity,
            last_success_time: None,
            last_failure_time: None,
        }
    }

    /// Record a successful call and its latency in milliseconds
    pub fn record_success(&mut self, latency_ms: f64) {
        self.successes += 1;
        if self.response_times_ms.len() == self.capacity {
            self.response_times_ms.pop_front();
        }
        self.response_times_ms.push_back(latency_ms);
        self.last_success_time = Some(Instant::now());
    }

    /// Record a failed call
    pub fn record_failure(&mut self) {
        self.failures += 1;
        self.last_failure_time = Some(Instant::now());
    }

    /// `failures / (failures + successes)`, or 0.0 with no samples
    pub fn failure_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.failures as f64 / total as f64
    }

    /// Mean of the latency window in milliseconds, or 0.0 when empty
    pub fn avg_response_time_ms(&self) -> f64 {
        if self.response_times_ms.is_empty() {
            return 0.0;
        }
        self.response_times_ms.iter().sum::<f64>() / self.response_times_ms.len() as f64
    }

    /// Zero the success and failure counters.
    ///
    /// Latency history and timestamps are kept.
    pub fn reset_counters(&mut self) {
        self.successes = 0;
        self.failures = 0;
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Calls recorded since the last counter reset
    pub fn total(&self) -> u64 {
        self.successes + self.failures
    }

    /// Number of latency samples currently in the window
    pub fn latency_samples(&self) -> usize {
        self.response_times_ms.len()
    }

    pub fn last_success_time(&self) -> Option<Instant> {
        self.last_success_time
    }

    pub fn last_failure_time(&self) -> Option<Instant> {
        self.last_failure_time
    }
}

impl Default for ComponentStatus {
    fn default() -> Self {
        Self::new()
    }
}
