//! Simulated capability tiers
//!
//! Stand-ins for real model servers, vector indexes and LLM endpoints.
//! Each tier implements one kernel capability trait and degrades the way a
//! real backing call would, driven by a [`FaultInjector`].

pub mod corpus;
pub mod embedding;
pub mod fault;
pub mod generation;
pub mod retrieval;
pub mod similarity;

pub use corpus::{IndexedCorpus, IndexedDocument};
pub use embedding::{CachedEmbedder, PrimaryEmbedder, SecondaryEmbedder};
pub use fault::{FaultInjector, FaultProfile};
pub use generation::{FallbackGenerator, PrimaryGenerator, TemplateGenerator};
pub use retrieval::{NoneRetriever, PrimaryRetriever, ReducedRetriever};
pub use similarity::cosine_similarity;

// Re-export kernel types for convenience
pub use bulwark_kernel::{Embedder, Generator, RetrievedDocument, Retriever};
