//! Capability contracts
//!
//! A protected pipeline is made of three capability types. Each type may
//! have several interchangeable implementations (a primary and a series of
//! progressively degraded tiers); the traits below are the seam they all
//! share.

pub mod contracts;
pub mod error;
pub mod types;

pub use contracts::{Embedder, Generator, Retriever};
pub use error::{CapabilityError, CapabilityResult};
pub use types::{ComponentType, RetrievedDocument};
