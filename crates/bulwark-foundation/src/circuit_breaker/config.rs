//! Circuit Breaker Configuration
//!
//! Thresholds and timings for a single breaker, with presets and
//! builder-style setters.

use bulwark_kernel::utils::{duration_secs, option_duration_secs};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a circuit breaker
///
/// Durations are written as (fractional) seconds in config files:
///
/// ```toml
/// failure_threshold = 0.4
/// min_samples = 3
/// recovery_timeout = 10
/// call_timeout = 2.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Failure rate in (0, 1] at or above which a closed circuit opens
    pub failure_threshold: f64,
    /// Minimum number of recorded calls before the failure rate is trusted
    pub min_samples: u32,
    /// Time an open circuit waits before admitting a half-open probe
    #[serde(with = "duration_secs")]
    pub recovery_timeout: Duration,
    /// Deadline for a single primary call; exceeding it counts as a failure
    #[serde(with = "option_duration_secs")]
    pub call_timeout: Option<Duration>,
    /// Whether the circuit breaker is enabled
    pub enabled: bool,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 0.4,
            min_samples: 3,
            recovery_timeout: Duration::from_secs(10),
            call_timeout: None,
            enabled: true,
        }
    }
}

impl CircuitBreakerConfig {
    /// Set the failure rate threshold, clamped into (0, 1]
    pub fn with_failure_threshold(mut self, threshold: f64) -> Self {
        self.failure_threshold = threshold.clamp(f64::MIN_POSITIVE, 1.0);
        self
    }

    /// Set the minimum sample count
    pub fn with_min_samples(mut self, min_samples: u32) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Set the recovery timeout
    pub fn with_recovery_timeout(mut self, timeout: Duration) -> Self {
        self.recovery_timeout = timeout;
        self
    }

    /// Set a per-call deadline for the primary
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Enable or disable the circuit breaker
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Opens quickly and probes again soon
    pub fn strict() -> Self {
        Self {
            failure_threshold: 0.25,
            min_samples: 2,
            recovery_timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    /// Tolerates a noisy dependency before opening
    pub fn lenient() -> Self {
        Self {
            failure_threshold: 0.7,
            min_samples: 10,
            recovery_timeout: Duration::from_secs(30),
            ..Default::default()
        }
    }

    /// No circuit breaking; every call reaches the primary
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Reject settings the state machine cannot act on.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.failure_threshold > 0.0 && self.failure_threshold <= 1.0) {
            return Err(format!(
                "failure_threshold must be in (0, 1], got {}",
                self.failure_threshold
            ));
        }
        if self.min_samples == 0 {
            return Err("min_samples must be at least 1".to_string());
        }
        if self.call_timeout.is_some_and(|t| t.is_zero()) {
            return Err("call_timeout must be positive when set".to_string());
        }
        Ok(())
    }
}
