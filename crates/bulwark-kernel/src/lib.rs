//! Bulwark Kernel
//!
//! Contracts shared by every bulwark crate: the three capability traits a
//! protected pipeline is built from, the data that flows between them, the
//! capability error taxonomy, and the configuration loader.
//!
//! Concrete capability tiers, the circuit breaker and the orchestrator live
//! in `bulwark-foundation`.

// capability module
pub mod capability;
pub use capability::{
    CapabilityError, CapabilityResult, ComponentType, Embedder, Generator, RetrievedDocument,
    Retriever,
};

// config module
#[cfg(feature = "config")]
pub mod config;

// utils module
pub mod utils;

// error module
pub mod error;
pub use error::{KernelError, KernelResult};
