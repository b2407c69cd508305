//! Resilient embed → retrieve → generate pipeline
//!
//! The [`Orchestrator`] owns one [`CircuitBreaker`] per stage and the
//! [`FallbackStrategy`] whose chains back them. Each stage calls
//! `breaker.execute` with the chain's primary, and a fallback that walks the
//! rest of the chain. When the whole chain fails the stage yields a terminal
//! default, so every query produces an answer.

mod health;

pub use health::{ComponentHealth, SystemHealth};

use crate::circuit_breaker::{CircuitBreaker, FallbackStrategy, walk_chain};
use crate::config::OrchestratorConfig;
use bulwark_kernel::{
    CapabilityError, ComponentType, Embedder, Generator, RetrievedDocument, Retriever,
};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Answer returned when the generator chain is exhausted
pub const TERMINAL_ANSWER: &str =
    "I'm sorry, I'm unable to answer right now. Please try again later.";

/// Answer returned when a failure escapes the protected stages
pub const DEGRADED_ANSWER: &str = "The service is temporarily degraded. Please try again later.";

/// Construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum OrchestratorError {
    /// The strategy has no implementation at index 0 for a stage
    #[error("No primary {0} configured")]
    MissingPrimary(ComponentType),
}

/// Three-stage pipeline guarded by per-stage circuit breakers
pub struct Orchestrator {
    strategy: FallbackStrategy,
    embedders: Vec<Arc<dyn Embedder>>,
    retrievers: Vec<Arc<dyn Retriever>>,
    generators: Vec<Arc<dyn Generator>>,
    embedding_breaker: Arc<CircuitBreaker>,
    retrieval_breaker: Arc<CircuitBreaker>,
    generation_breaker: Arc<CircuitBreaker>,
    top_k: usize,
}

impl Orchestrator {
    /// Build the orchestrator; every stage needs a primary implementation.
    pub fn new(
        strategy: FallbackStrategy,
        config: OrchestratorConfig,
    ) -> Result<Self, OrchestratorError> {
        let embedders = strategy.embedder_chain();
        let retrievers = strategy.retriever_chain();
        let generators = strategy.generator_chain();

        for (component, len) in [
            (ComponentType::Embedder, embedders.len()),
            (ComponentType::Retriever, retrievers.len()),
            (ComponentType::Generator, generators.len()),
        ] {
            if len == 0 {
                return Err(OrchestratorError::MissingPrimary(component));
            }
        }

        let breaker = |component| CircuitBreaker::new(component, config.breaker(component).clone());

        Ok(Self {
            embedding_breaker: breaker(ComponentType::Embedder),
            retrieval_breaker: breaker(ComponentType::Retriever),
            generation_breaker: breaker(ComponentType::Generator),
            strategy,
            embedders,
            retrievers,
            generators,
            top_k: config.top_k,
        })
    }

    /// Answer `text` with the configured default `top_k`.
    pub async fn query(&self, text: &str) -> String {
        self.query_with_top_k(text, self.top_k).await
    }

    /// Answer `text`, retrieving up to `top_k` documents.
    ///
    /// Never fails: capability errors, panics and timeouts are absorbed by
    /// the breakers and fallback chains, and anything that still escapes
    /// becomes [`DEGRADED_ANSWER`].
    pub async fn query_with_top_k(&self, text: &str, top_k: usize) -> String {
        match AssertUnwindSafe(self.run(text, top_k)).catch_unwind().await {
            Ok(Ok(answer)) => answer,
            Ok(Err(error)) => {
                error!(%error, "Unexpected orchestration failure");
                DEGRADED_ANSWER.to_string()
            }
            Err(_) => {
                error!("Unexpected orchestration failure: pipeline panicked");
                DEGRADED_ANSWER.to_string()
            }
        }
    }

    async fn run(&self, text: &str, top_k: usize) -> Result<String, CapabilityError> {
        let embedder = &self.embedders[0];
        let embedding = self
            .embedding_breaker
            .execute(
                || async move { embedder.embed(text).await },
                || async move { Ok(self.embed_fallback(text).await) },
            )
            .await?;
        debug!(dimension = embedding.len(), "Query embedded");

        let retriever = &self.retrievers[0];
        let query_embedding = embedding.as_slice();
        let documents = self
            .retrieval_breaker
            .execute(
                || async move { retriever.retrieve(query_embedding, top_k).await },
                || async move { Ok(self.retrieve_fallback(query_embedding, top_k).await) },
            )
            .await?;
        debug!(documents = documents.len(), "Documents retrieved");

        let generator = &self.generators[0];
        let context = documents.as_slice();
        self.generation_breaker
            .execute(
                || async move { generator.generate(text, Some(context)).await },
                || async move { Ok(self.generate_fallback(text, context).await) },
            )
            .await
    }

    async fn embed_fallback(&self, text: &str) -> Vec<f32> {
        let chain = self.embedders.get(1..).unwrap_or(&[]);
        let deadline = self.embedding_breaker.config().call_timeout;
        let walked = walk_chain(ComponentType::Embedder, chain, deadline, |tier| async move {
            tier.embed(text).await
        })
        .await;
        walked.unwrap_or_else(|| {
            let dimension = self.embedders[0].dimension();
            warn!(component = %ComponentType::Embedder, dimension, "Fallback chain exhausted, using zero vector");
            vec![0.0; dimension]
        })
    }

    async fn retrieve_fallback(&self, query_embedding: &[f32], top_k: usize) -> Vec<RetrievedDocument> {
        let chain = self.retrievers.get(1..).unwrap_or(&[]);
        let deadline = self.retrieval_breaker.config().call_timeout;
        let walked = walk_chain(ComponentType::Retriever, chain, deadline, |tier| async move {
            tier.retrieve(query_embedding, top_k).await
        })
        .await;
        walked.unwrap_or_else(|| {
            warn!(component = %ComponentType::Retriever, "Fallback chain exhausted, using no documents");
            Vec::new()
        })
    }

    async fn generate_fallback(&self, prompt: &str, context: &[RetrievedDocument]) -> String {
        let chain = self.generators.get(1..).unwrap_or(&[]);
        let deadline = self.generation_breaker.config().call_timeout;
        let walked = walk_chain(ComponentType::Generator, chain, deadline, |tier| async move {
            tier.generate(prompt, Some(context)).await
        })
        .await;
        walked.unwrap_or_else(|| {
            warn!(component = %ComponentType::Generator, "Fallback chain exhausted, using canned answer");
            TERMINAL_ANSWER.to_string()
        })
    }

    /// State, failure rate and latency of every stage.
    ///
    /// Read-only: never moves a breaker between states.
    pub fn get_system_health(&self) -> SystemHealth {
        ComponentType::ALL
            .into_iter()
            .map(|component| {
                let snapshot = self.breaker(component).snapshot();
                (component.as_str().to_string(), ComponentHealth::from(&snapshot))
            })
            .collect()
    }

    /// The breaker guarding `component`
    pub fn breaker(&self, component: ComponentType) -> &Arc<CircuitBreaker> {
        match component {
            ComponentType::Embedder => &self.embedding_breaker,
            ComponentType::Retriever => &self.retrieval_breaker,
            ComponentType::Generator => &self.generation_breaker,
        }
    }

    pub fn strategy(&self) -> &FallbackStrategy {
        &self.strategy
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("strategy", &self.strategy)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}
