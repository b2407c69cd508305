//! Circuit Breaker State Machine
//!
//! Implements the core circuit breaker state machine with three states:
//! - Closed: Normal operation, every call reaches the primary
//! - Open: The primary is skipped and calls go straight to the fallback
//! - Half-Open: A single probe call tests whether the primary has recovered
//!
//! State lives behind a mutex that is never held across an `.await`.
//! `execute` takes it twice: once to admit the call (possibly moving
//! Open → Half-Open and reserving the probe slot), once to record the
//! outcome (possibly opening or closing the circuit).

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use bulwark_kernel::{CapabilityError, ComponentType};
use futures::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::config::CircuitBreakerConfig;
use super::metrics::{CircuitBreakerMetrics, CircuitBreakerMetricsSnapshot, StateTransition};
use super::status::ComponentStatus;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Normal operation - calls reach the primary
    Closed,
    /// Circuit is open - calls go to the fallback
    Open,
    /// Testing recovery - one probe call reaches the primary
    HalfOpen,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Closed => "closed",
            State::Open => "open",
            State::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of a breaker's state, counters and metrics, taken
/// under a single lock.
#[derive(Debug, Clone)]
pub struct BreakerSnapshot {
    pub component: ComponentType,
    pub state: State,
    pub status: ComponentStatus,
    pub metrics: CircuitBreakerMetricsSnapshot,
}

#[derive(Debug)]
struct Inner {
    state: State,
    last_state_change: Instant,
    status: ComponentStatus,
    metrics: CircuitBreakerMetrics,
    probe_in_flight: bool,
}

impl Inner {
    fn transition(&mut self, to: State) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        self.last_state_change = Instant::now();
        self.metrics.record_transition(StateTransition::new(from, to));
    }
}

enum Admission {
    Primary { probe: bool },
    ShortCircuit,
}

/// Circuit breaker guarding one capability type
#[derive(Debug)]
pub struct CircuitBreaker {
    component: ComponentType,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker in the closed state
    pub fn new(component: ComponentType, config: CircuitBreakerConfig) -> Arc<Self> {
        Arc::new(Self {
            component,
            config,
            inner: Mutex::new(Inner {
                state: State::Closed,
                last_state_change: Instant::now(),
                status: ComponentStatus::new(),
                metrics: CircuitBreakerMetrics::new(),
                probe_in_flight: false,
            }),
        })
    }

    /// Create with default configuration
    pub fn with_default(component: ComponentType) -> Arc<Self> {
        Self::new(component, CircuitBreakerConfig::default())
    }

    /// Run `primary` under circuit protection, or `fallback` instead.
    ///
    /// - Open and still cooling down: `primary` is not invoked.
    /// - Open and `recovery_timeout` elapsed: the circuit goes half-open,
    ///   counters are reset and this call becomes the probe.
    /// - Half-open with a probe already running: `primary` is not invoked.
    ///
    /// A primary error, panic or missed `call_timeout` deadline is recorded
    /// and swallowed; the fallback's result is returned in its place. Only an
    /// error from `fallback` itself reaches the caller.
    pub async fn execute<T, E, P, PFut, F, FFut>(&self, primary: P, fallback: F) -> Result<T, E>
    where
        P: FnOnce() -> PFut,
        PFut: Future<Output = Result<T, E>>,
        F: FnOnce() -> FFut,
        FFut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let probe = match self.admit() {
            Admission::ShortCircuit => return fallback().await,
            Admission::Primary { probe } => probe,
        };

        let guard = ProbeGuard {
            breaker: self,
            armed: probe,
        };
        let started = Instant::now();
        let outcome = guarded_call(
            self.component,
            self.config.call_timeout,
            async move { primary().await },
        )
        .await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        guard.disarm();

        match outcome {
            Ok(value) => {
                self.on_success(probe, elapsed_ms);
                Ok(value)
            }
            Err(reason) => {
                self.on_failure(probe, &reason);
                fallback().await
            }
        }
    }

    /// Current state.
    ///
    /// A pure read: an open circuit whose recovery timeout has elapsed
    /// stays open here until the next `execute` call probes it.
    pub fn state(&self) -> State {
        self.inner.lock().state
    }

    /// Copy of the current health counters
    pub fn status(&self) -> ComponentStatus {
        self.inner.lock().status.clone()
    }

    pub fn failure_rate(&self) -> f64 {
        self.inner.lock().status.failure_rate()
    }

    pub fn avg_response_time_ms(&self) -> f64 {
        self.inner.lock().status.avg_response_time_ms()
    }

    /// Snapshot of state, status and metrics taken atomically
    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.inner.lock();
        BreakerSnapshot {
            component: self.component,
            state: inner.state,
            status: inner.status.clone(),
            metrics: inner.metrics.snapshot(),
        }
    }

    /// Most recent state transitions, oldest first
    pub fn recent_transitions(&self, n: usize) -> Vec<StateTransition> {
        self.inner.lock().metrics.recent_transitions(n)
    }

    /// Force the circuit closed and zero its counters.
    ///
    /// Latency history and metrics are kept.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.transition(State::Closed);
        inner.status.reset_counters();
        inner.probe_in_flight = false;
        info!(component = %self.component, "Circuit breaker manually reset");
    }

    pub fn component(&self) -> ComponentType {
        self.component
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    // =========================================================================
    // Private methods
    // =========================================================================

    fn admit(&self) -> Admission {
        if !self.config.enabled {
            return Admission::Primary { probe: false };
        }

        let mut inner = self.inner.lock();
        let state = inner.state;
        match state {
            State::Closed => Admission::Primary { probe: false },
            State::Open if inner.last_state_change.elapsed() >= self.config.recovery_timeout => {
                inner.transition(State::HalfOpen);
                inner.status.reset_counters();
                inner.probe_in_flight = true;
                debug!(component = %self.component, "Circuit half-open, admitting probe");
                Admission::Primary { probe: true }
            }
            State::HalfOpen if !inner.probe_in_flight => {
                inner.probe_in_flight = true;
                debug!(component = %self.component, "Circuit half-open, admitting probe");
                Admission::Primary { probe: true }
            }
            State::Open | State::HalfOpen => {
                inner.metrics.record_rejected();
                debug!(component = %self.component, %state, "Short-circuiting to fallback");
                Admission::ShortCircuit
            }
        }
    }

    fn on_success(&self, probe: bool, elapsed_ms: f64) {
        let mut inner = self.inner.lock();
        inner.status.record_success(elapsed_ms);
        debug!(component = %self.component, elapsed_ms, "Primary call succeeded");

        if probe {
            inner.probe_in_flight = false;
            if inner.state == State::HalfOpen {
                inner.transition(State::Closed);
                info!(component = %self.component, "Probe succeeded, circuit closed");
            }
        }
    }

    fn on_failure(&self, probe: bool, reason: &str) {
        let mut inner = self.inner.lock();
        inner.status.record_failure();

        if !self.config.enabled {
            debug!(component = %self.component, reason, "Primary call failed");
            return;
        }

        if probe {
            inner.probe_in_flight = false;
            if inner.state == State::HalfOpen {
                inner.transition(State::Open);
                warn!(component = %self.component, reason, "Probe failed, circuit re-opened");
            }
            return;
        }

        let total = inner.status.total();
        let failure_rate = inner.status.failure_rate();
        if inner.state == State::Closed
            && total >= u64::from(self.config.min_samples)
            && failure_rate >= self.config.failure_threshold
        {
            inner.transition(State::Open);
            warn!(
                component = %self.component,
                failure_rate,
                samples = total,
                threshold = self.config.failure_threshold,
                reason,
                "Circuit opened"
            );
        } else {
            debug!(component = %self.component, reason, failure_rate, "Primary call failed");
        }
    }

    fn release_probe(&self) {
        self.inner.lock().probe_in_flight = false;
    }
}

/// Await `call`, turning an error, a panic or a missed deadline into a
/// failure reason.
pub(crate) async fn guarded_call<T, E, Fut>(
    component: ComponentType,
    call_timeout: Option<Duration>,
    call: Fut,
) -> Result<T, String>
where
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let call = async {
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(payload) => Err(format!("{component} call panicked: {}", panic_message(&*payload))),
        }
    };

    match call_timeout {
        Some(deadline) => tokio::time::timeout(deadline, call).await.unwrap_or_else(|_| {
            Err(CapabilityError::Timeout {
                component,
                duration_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
            }
            .to_string())
        }),
        None => call.await,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string payload")
}

/// Frees the probe slot if an admitted probe is dropped before it finishes.
struct ProbeGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl ProbeGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(component = %self.breaker.component, "Probe abandoned before completion");
            self.breaker.release_probe();
        }
    }
}
