//! Circuit Breaker Pattern Implementation
//!
//! - [`ComponentStatus`]: rolling success/failure counters and a latency window
//! - [`CircuitBreaker`]: closed / open / half-open state machine over a status
//! - [`FallbackStrategy`]: ordered, increasingly degraded implementations per
//!   component type
//! - [`CircuitBreakerMetrics`]: rejected-call counts and transition history
//!
//! # Architecture
//!
//! ```text
//!              failure rate >= threshold
//!              and samples >= min_samples
//!    +---------+ ------------------------> +--------+
//!    | CLOSED  |                           |  OPEN  | <-----+
//!    +---------+ <---+                     +--------+       |
//!                    |                         |            |
//!            probe   |      recovery_timeout   |            | probe
//!            succeeds|                         v            | fails
//!                    |                  +-------------+     |
//!                    +------------------|  HALF-OPEN  |-----+
//!                                       +-------------+
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use bulwark_foundation::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
//! use bulwark_kernel::ComponentType;
//!
//! let breaker = CircuitBreaker::new(ComponentType::Embedder, CircuitBreakerConfig::default());
//!
//! let vector = breaker
//!     .execute(
//!         || async { primary.embed(text).await },
//!         || async { cached.embed(text).await },
//!     )
//!     .await?;
//! ```

pub mod config;
pub mod fallback;
pub mod metrics;
pub mod state;
pub mod status;

pub use config::CircuitBreakerConfig;
pub use fallback::{Capability, FallbackBuilder, FallbackStrategy, Tier, walk_chain};
pub use metrics::{CircuitBreakerMetrics, CircuitBreakerMetricsSnapshot, StateTransition};
pub use state::{BreakerSnapshot, CircuitBreaker, State};
pub use status::{ComponentStatus, DEFAULT_LATENCY_WINDOW};
