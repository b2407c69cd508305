//! Capability traits
//!
//! One trait per capability type. Implementations are held as trait
//! objects (`Arc<dyn Embedder>` and friends) so that a primary and its
//! degraded tiers can sit side by side in one fallback chain.

use super::error::CapabilityResult;
use super::types::RetrievedDocument;
use async_trait::async_trait;

/// Turns text into an embedding vector.
///
/// # Example
///
/// ```rust,ignore
/// use bulwark_kernel::Embedder;
///
/// let vector = embedder.embed("what is a circuit breaker?").await?;
/// assert_eq!(vector.len(), embedder.dimension());
/// ```
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Human-readable tier name, used in logs
    fn name(&self) -> &str;

    /// Length of every vector this embedder produces.
    ///
    /// Constant for the lifetime of the embedder and queryable without a
    /// call to the backing service.
    fn dimension(&self) -> usize;

    /// Embed a piece of text.
    ///
    /// Fails with [`CapabilityError::EmbeddingUnavailable`](super::CapabilityError::EmbeddingUnavailable)
    /// when the backing service cannot respond.
    async fn embed(&self, text: &str) -> CapabilityResult<Vec<f32>>;
}

/// Finds the documents most similar to a query embedding.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Human-readable tier name, used in logs
    fn name(&self) -> &str;

    /// Return up to `top_k` documents, best match first.
    ///
    /// Fails with [`CapabilityError::RetrievalUnavailable`](super::CapabilityError::RetrievalUnavailable).
    async fn retrieve(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> CapabilityResult<Vec<RetrievedDocument>>;
}

/// Produces the answer text for a prompt and optional retrieved context.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Human-readable tier name, used in logs
    fn name(&self) -> &str;

    /// Generate a response.
    ///
    /// Fails with [`CapabilityError::GenerationUnavailable`](super::CapabilityError::GenerationUnavailable).
    async fn generate(
        &self,
        prompt: &str,
        context: Option<&[RetrievedDocument]>,
    ) -> CapabilityResult<String>;
}
