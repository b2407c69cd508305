//! Simulated retrieval tiers
//!
//! [`PrimaryRetriever`] honors `top_k`, [`ReducedRetriever`] caps results at
//! two, and [`NoneRetriever`] always returns nothing and never fails, which
//! makes it the guaranteed end of a retriever chain.

use crate::rag::corpus::IndexedCorpus;
use crate::rag::fault::FaultInjector;
use async_trait::async_trait;
use bulwark_kernel::{CapabilityResult, ComponentType, RetrievedDocument, Retriever};
use std::sync::Arc;

/// Result cap of the reduced tier
pub const REDUCED_RESULT_CAP: usize = 2;

/// Full similarity search over the corpus
#[derive(Debug)]
pub struct PrimaryRetriever {
    corpus: Arc<IndexedCorpus>,
    faults: FaultInjector,
}

impl PrimaryRetriever {
    pub fn new(corpus: Arc<IndexedCorpus>, faults: FaultInjector) -> Self {
        Self { corpus, faults }
    }

    pub fn reliable(corpus: Arc<IndexedCorpus>) -> Self {
        Self::new(corpus, FaultInjector::reliable())
    }
}

#[async_trait]
impl Retriever for PrimaryRetriever {
    fn name(&self) -> &str {
        "primary-retriever"
    }

    async fn retrieve(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> CapabilityResult<Vec<RetrievedDocument>> {
        self.faults
            .inject(ComponentType::Retriever, self.name())
            .await?;
        Ok(self.corpus.rank(query_embedding, top_k))
    }
}

/// Same ranking as the primary, at most [`REDUCED_RESULT_CAP`] results
#[derive(Debug)]
pub struct ReducedRetriever {
    corpus: Arc<IndexedCorpus>,
    faults: FaultInjector,
}

impl ReducedRetriever {
    pub fn new(corpus: Arc<IndexedCorpus>, faults: FaultInjector) -> Self {
        Self { corpus, faults }
    }

    pub fn reliable(corpus: Arc<IndexedCorpus>) -> Self {
        Self::new(corpus, FaultInjector::reliable())
    }
}

#[async_trait]
impl Retriever for ReducedRetriever {
    fn name(&self) -> &str {
        "reduced-retriever"
    }

    async fn retrieve(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> CapabilityResult<Vec<RetrievedDocument>> {
        self.faults
            .inject(ComponentType::Retriever, self.name())
            .await?;
        Ok(self
            .corpus
            .rank(query_embedding, top_k.min(REDUCED_RESULT_CAP)))
    }
}

/// Always succeeds with no documents
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneRetriever;

#[async_trait]
impl Retriever for NoneRetriever {
    fn name(&self) -> &str {
        "none-retriever"
    }

    async fn retrieve(
        &self,
        _query_embedding: &[f32],
        _top_k: usize,
    ) -> CapabilityResult<Vec<RetrievedDocument>> {
        Ok(Vec::new())
    }
}
