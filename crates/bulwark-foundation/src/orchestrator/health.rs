//! Per-component health report

use crate::circuit_breaker::BreakerSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Health of one protected stage, keyed by component name in [`SystemHealth`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// `"closed"`, `"open"` or `"half_open"`
    pub state: String,
    /// Failures over samples since the last counter reset
    pub failure_rate: f64,
    /// Mean of the recent latency window
    pub avg_latency_ms: f64,
    pub successes: u64,
    pub failures: u64,
    /// Calls short-circuited to the fallback chain
    pub rejected: u64,
    pub transitions: u64,
}

impl From<&BreakerSnapshot> for ComponentHealth {
    fn from(snapshot: &BreakerSnapshot) -> Self {
        Self {
            state: snapshot.state.as_str().to_string(),
            failure_rate: snapshot.status.failure_rate(),
            avg_latency_ms: snapshot.status.avg_response_time_ms(),
            successes: snapshot.status.successes(),
            failures: snapshot.status.failures(),
            rejected: snapshot.metrics.total_rejected,
            transitions: snapshot.metrics.total_transitions,
        }
    }
}

/// Component name (`"embedder"`, `"retriever"`, `"generator"`) to health
pub type SystemHealth = BTreeMap<String, ComponentHealth>;
