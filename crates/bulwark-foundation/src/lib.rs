//! Bulwark Foundation
//!
//! Circuit breakers, fallback chains, simulated capability tiers and the
//! orchestrator that composes them into a pipeline that always answers.

// circuit breaker module - state machine, status tracking and fallback chains
pub mod circuit_breaker;

// config module - pipeline configuration and default pipeline assembly
pub mod config;

// orchestrator module - embed → retrieve → generate under protection
pub mod orchestrator;

// rag module - simulated embedding, retrieval and generation tiers
pub mod rag;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, ComponentStatus, FallbackStrategy, State,
};
pub use config::{OrchestratorConfig, PipelineConfig, SimulationConfig};
pub use orchestrator::{
    ComponentHealth, DEGRADED_ANSWER, Orchestrator, OrchestratorError, SystemHealth,
    TERMINAL_ANSWER,
};
