//! Pipeline configuration
//!
//! One document configures the whole pipeline: the per-stage breakers, the
//! default `top_k`, the simulated tiers and the sample corpus.
//!
//! ```yaml
//! embedding_dimension: 64
//! orchestrator:
//!   top_k: 3
//!   embedder:
//!     failure_threshold: 0.4
//!     min_samples: 3
//!     recovery_timeout: 10
//!     call_timeout: 0.5
//! simulation:
//!   seed: 7
//!   primary_embedder:
//!     failure_rate: 0.3
//!     min_latency: 0.01
//!     max_latency: 0.05
//! ```

use crate::circuit_breaker::{CircuitBreakerConfig, FallbackStrategy};
use crate::orchestrator::Orchestrator;
use crate::rag::{
    CachedEmbedder, FallbackGenerator, FaultInjector, FaultProfile, IndexedCorpus, NoneRetriever,
    PrimaryEmbedder, PrimaryGenerator, PrimaryRetriever, ReducedRetriever, SecondaryEmbedder,
    TemplateGenerator,
};
use bulwark_kernel::config::{self, ConfigError, ConfigResult, Format};
use bulwark_kernel::{ComponentType, KernelError, KernelResult};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 64;

/// Breaker settings per stage plus the default result count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub top_k: usize,
    pub embedder: CircuitBreakerConfig,
    pub retriever: CircuitBreakerConfig,
    pub generator: CircuitBreakerConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            embedder: CircuitBreakerConfig::default(),
            retriever: CircuitBreakerConfig::default(),
            generator: CircuitBreakerConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Use the same breaker settings for every stage
    pub fn with_breakers(mut self, config: CircuitBreakerConfig) -> Self {
        self.embedder = config.clone();
        self.retriever = config.clone();
        self.generator = config;
        self
    }

    pub fn breaker(&self, component: ComponentType) -> &CircuitBreakerConfig {
        match component {
            ComponentType::Embedder => &self.embedder,
            ComponentType::Retriever => &self.retriever,
            ComponentType::Generator => &self.generator,
        }
    }
}

/// Fault profiles of the simulated tiers.
///
/// Last-resort tiers (cached embedder, none retriever, template generator)
/// never fail and take no profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for reproducible fault sequences; entropy when absent
    pub seed: Option<u64>,
    pub primary_embedder: FaultProfile,
    pub secondary_embedder: FaultProfile,
    pub primary_retriever: FaultProfile,
    pub reduced_retriever: FaultProfile,
    pub primary_generator: FaultProfile,
    pub fallback_generator: FaultProfile,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            primary_embedder: FaultProfile::failing(0.1),
            secondary_embedder: FaultProfile::failing(0.05),
            primary_retriever: FaultProfile::failing(0.1),
            reduced_retriever: FaultProfile::failing(0.05),
            primary_generator: FaultProfile::failing(0.15),
            fallback_generator: FaultProfile::failing(0.05),
        }
    }
}

impl SimulationConfig {
    /// Every tier reliable
    pub fn reliable() -> Self {
        Self {
            seed: None,
            primary_embedder: FaultProfile::reliable(),
            secondary_embedder: FaultProfile::reliable(),
            primary_retriever: FaultProfile::reliable(),
            reduced_retriever: FaultProfile::reliable(),
            primary_generator: FaultProfile::reliable(),
            fallback_generator: FaultProfile::reliable(),
        }
    }

    // Each tier gets its own stream so one tier's draws do not shift another's.
    fn injector(&self, profile: FaultProfile, stream: u64) -> FaultInjector {
        match self.seed {
            Some(seed) => FaultInjector::seeded(profile, seed.wrapping_add(stream)),
            None => FaultInjector::new(profile),
        }
    }
}

/// Complete configuration of the simulated pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub embedding_dimension: usize,
    pub orchestrator: OrchestratorConfig,
    pub simulation: SimulationConfig,
    /// Texts indexed for retrieval
    pub corpus: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            orchestrator: OrchestratorConfig::default(),
            simulation: SimulationConfig::default(),
            corpus: sample_corpus(),
        }
    }
}

impl PipelineConfig {
    /// Load from a file; the format follows the extension
    pub fn load(path: &str) -> KernelResult<Self> {
        config::load_config(path)
            .and_then(Self::validated)
            .map_err(KernelError::from)
            .map_err(Report::new)
            .attach(format!("loading pipeline config from {path}"))
    }

    /// Load from a file, then apply `{PREFIX}_...` environment overrides
    pub fn load_with_env(path: &str, env_prefix: &str) -> KernelResult<Self> {
        config::load_with_env(path, env_prefix)
            .and_then(Self::validated)
            .map_err(KernelError::from)
            .map_err(Report::new)
            .attach(format!("loading pipeline config from {path} with {env_prefix}_* overrides"))
    }

    pub fn from_str(content: &str, format: Format) -> KernelResult<Self> {
        config::from_str(content, format)
            .and_then(Self::validated)
            .map_err(KernelError::from)
            .map_err(Report::new)
            .attach("parsing inline pipeline config")
    }

    /// Check every breaker and fault profile; loaders call this before
    /// returning.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.embedding_dimension == 0 {
            return Err(ConfigError::Invalid(
                "embedding_dimension must be at least 1".to_string(),
            ));
        }
        for component in ComponentType::ALL {
            self.orchestrator
                .breaker(component)
                .validate()
                .map_err(|reason| ConfigError::Invalid(format!("orchestrator.{component}: {reason}")))?;
        }
        let sim = &self.simulation;
        let profiles = [
            ("primary_embedder", &sim.primary_embedder),
            ("secondary_embedder", &sim.secondary_embedder),
            ("primary_retriever", &sim.primary_retriever),
            ("reduced_retriever", &sim.reduced_retriever),
            ("primary_generator", &sim.primary_generator),
            ("fallback_generator", &sim.fallback_generator),
        ];
        for (tier, profile) in profiles {
            profile
                .validate()
                .map_err(|reason| ConfigError::Invalid(format!("simulation.{tier}: {reason}")))?;
        }
        Ok(())
    }

    fn validated(self) -> ConfigResult<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Build the three-tier chains for every stage.
    ///
    /// The corpus and the cached embedder are precomputed with a reliable
    /// copy of the primary embedder, so they share its vector space. The
    /// secondary embedder does not: while it serves queries, retrieval
    /// returns a full but loosely ranked context.
    pub async fn build_strategy(&self) -> KernelResult<FallbackStrategy> {
        let dimension = self.embedding_dimension;
        let sim = &self.simulation;
        let reference = PrimaryEmbedder::reliable(dimension);

        let corpus = IndexedCorpus::index_texts(&reference, &self.corpus)
            .await
            .map_err(KernelError::from)
            .map_err(Report::new)
            .attach("indexing the sample corpus")?;
        let corpus = Arc::new(corpus);
        let cached = CachedEmbedder::new(dimension)
            .warm(&reference, &self.corpus)
            .await;

        Ok(FallbackStrategy::builder()
            .embedder(Arc::new(PrimaryEmbedder::new(
                dimension,
                sim.injector(sim.primary_embedder, 0),
            )))
            .embedder(Arc::new(SecondaryEmbedder::new(
                dimension,
                sim.injector(sim.secondary_embedder, 1),
            )))
            .embedder(Arc::new(cached))
            .retriever(Arc::new(PrimaryRetriever::new(
                corpus.clone(),
                sim.injector(sim.primary_retriever, 2),
            )))
            .retriever(Arc::new(ReducedRetriever::new(
                corpus,
                sim.injector(sim.reduced_retriever, 3),
            )))
            .retriever(Arc::new(NoneRetriever))
            .generator(Arc::new(PrimaryGenerator::new(
                sim.injector(sim.primary_generator, 4),
            )))
            .generator(Arc::new(FallbackGenerator::new(
                sim.injector(sim.fallback_generator, 5),
            )))
            .generator(Arc::new(TemplateGenerator))
            .build())
    }

    /// Build the strategy and wrap it in an [`Orchestrator`]
    pub async fn build_orchestrator(&self) -> KernelResult<Orchestrator> {
        let strategy = self.build_strategy().await?;
        Orchestrator::new(strategy, self.orchestrator.clone())
            .map_err(|e| KernelError::Internal(e.to_string()))
            .map_err(Report::new)
            .attach("assembling the orchestrator")
    }
}

/// Built-in corpus used when the config names none
pub fn sample_corpus() -> Vec<String> {
    [
        "A circuit breaker stops calling a dependency once its failure rate crosses a threshold.",
        "While a circuit is open, calls are routed straight to the fallback chain.",
        "After the recovery timeout a single half-open probe tests whether the dependency recovered.",
        "A successful probe closes the circuit; a failed probe opens it again.",
        "Fallback chains order implementations from primary to last resort.",
        "Terminal defaults guarantee the pipeline always produces an answer.",
        "Embeddings map text to vectors so similar texts land close together.",
        "Retrieval ranks indexed documents by cosine similarity to the query vector.",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
