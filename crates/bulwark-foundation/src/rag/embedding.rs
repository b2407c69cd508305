//! Simulated embedding tiers
//!
//! | Tier | Fidelity | Failure |
//! |------|----------|---------|
//! | [`PrimaryEmbedder`] | dense text-seeded vector | configurable |
//! | [`SecondaryEmbedder`] | hashed bag of words | configurable, usually lower |
//! | [`CachedEmbedder`] | precomputed lookup | never |

use crate::rag::fault::FaultInjector;
use crate::rag::similarity::{normalize, stable_hash};
use async_trait::async_trait;
use bulwark_kernel::{CapabilityResult, ComponentType, Embedder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Full-fidelity embedder.
///
/// Produces a deterministic unit vector seeded by the text, so equal texts
/// always embed identically.
#[derive(Debug)]
pub struct PrimaryEmbedder {
    dimension: usize,
    faults: FaultInjector,
}

impl PrimaryEmbedder {
    pub fn new(dimension: usize, faults: FaultInjector) -> Self {
        Self { dimension, faults }
    }

    pub fn reliable(dimension: usize) -> Self {
        Self::new(dimension, FaultInjector::reliable())
    }

    /// The vector this embedder returns for `text` when it does not fail
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(stable_hash(text.as_bytes()));
        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|_| rng.gen_range(-1.0f32..=1.0))
            .collect();
        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for PrimaryEmbedder {
    fn name(&self) -> &str {
        "primary-embedder"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> CapabilityResult<Vec<f32>> {
        self.faults.inject(ComponentType::Embedder, self.name()).await?;
        Ok(self.vector_for(text))
    }
}

/// Lower-fidelity embedder hashing lowercase tokens into buckets.
///
/// Its vectors do not live in [`PrimaryEmbedder`]'s space. A corpus indexed
/// with the primary still ranks and returns `top_k` documents for a
/// secondary query vector, but the order no longer tracks relevance.
#[derive(Debug)]
pub struct SecondaryEmbedder {
    dimension: usize,
    faults: FaultInjector,
}

impl SecondaryEmbedder {
    pub fn new(dimension: usize, faults: FaultInjector) -> Self {
        Self { dimension, faults }
    }

    pub fn reliable(dimension: usize) -> Self {
        Self::new(dimension, FaultInjector::reliable())
    }

    /// The vector this embedder returns for `text` when it does not fail
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return vector;
        }
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = stable_hash(token.to_lowercase().as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for SecondaryEmbedder {
    fn name(&self) -> &str {
        "secondary-embedder"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> CapabilityResult<Vec<f32>> {
        self.faults.inject(ComponentType::Embedder, self.name()).await?;
        Ok(self.vector_for(text))
    }
}

/// Lookup of precomputed vectors; never fails.
///
/// Unknown texts get the same constant unit vector.
#[derive(Debug, Clone)]
pub struct CachedEmbedder {
    dimension: usize,
    cache: HashMap<String, Vec<f32>>,
}

impl CachedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            cache: HashMap::new(),
        }
    }

    /// Add a precomputed vector, padded or truncated to the dimension
    pub fn with_entry(mut self, text: impl Into<String>, mut vector: Vec<f32>) -> Self {
        vector.resize(self.dimension, 0.0);
        self.cache.insert(text.into(), vector);
        self
    }

    /// Precompute vectors for `texts` using another embedder.
    ///
    /// Texts the source fails to embed are skipped.
    pub async fn warm<S: AsRef<str>>(mut self, source: &dyn Embedder, texts: &[S]) -> Self {
        for text in texts {
            let text = text.as_ref();
            if let Ok(vector) = source.embed(text).await {
                self = self.with_entry(text, vector);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn default_vector(&self) -> Vec<f32> {
        if self.dimension == 0 {
            return Vec::new();
        }
        vec![1.0 / (self.dimension as f32).sqrt(); self.dimension]
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    fn name(&self) -> &str {
        "cached-embedder"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> CapabilityResult<Vec<f32>> {
        Ok(self
            .cache
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default_vector()))
    }
}
