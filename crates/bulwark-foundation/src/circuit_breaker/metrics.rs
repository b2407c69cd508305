//! Circuit Breaker Metrics
//!
//! Counts short-circuited calls and keeps a bounded history of state
//! transitions for observability.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use super::state::State;

/// Number of transitions kept in the history
pub const TRANSITION_HISTORY: usize = 100;

/// State transition event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Previous state
    pub from_state: State,
    /// New state
    pub to_state: State,
    /// Timestamp of transition (milliseconds since Unix epoch)
    pub timestamp_ms: u64,
}

impl StateTransition {
    /// Create a new state transition stamped with the wall clock
    pub fn new(from_state: State, to_state: State) -> Self {
        Self {
            from_state,
            to_state,
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
        }
    }
}

/// Circuit breaker metrics
#[derive(Debug, Clone, Default)]
pub struct CircuitBreakerMetrics {
    total_rejected: u64,
    total_transitions: u64,
    transitions: VecDeque<StateTransition>,
}

impl CircuitBreakerMetrics {
    /// Create new metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call short-circuited to the fallback without trying the primary
    pub fn record_rejected(&mut self) {
        self.total_rejected += 1;
    }

    /// Record a state transition
    pub fn record_transition(&mut self, transition: StateTransition) {
        self.total_transitions += 1;
        if self.transitions.len() == TRANSITION_HISTORY {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    pub fn total_rejected(&self) -> u64 {
        self.total_rejected
    }

    pub fn total_transitions(&self) -> u64 {
        self.total_transitions
    }

    /// Most recent transitions, oldest first (at most `n`)
    pub fn recent_transitions(&self, n: usize) -> Vec<StateTransition> {
        let skip = self.transitions.len().saturating_sub(n);
        self.transitions.iter().skip(skip).cloned().collect()
    }

    /// Take a snapshot of current metrics
    pub fn snapshot(&self) -> CircuitBreakerMetricsSnapshot {
        CircuitBreakerMetricsSnapshot {
            total_rejected: self.total_rejected,
            total_transitions: self.total_transitions,
            last_transition: self.transitions.back().cloned(),
        }
    }
}

/// Serializable metrics for monitoring/display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerMetricsSnapshot {
    /// Calls routed straight to the fallback
    pub total_rejected: u64,
    /// Number of state transitions
    pub total_transitions: u64,
    /// The latest transition, if any
    pub last_transition: Option<StateTransition>,
}
