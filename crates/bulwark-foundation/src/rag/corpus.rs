//! In-memory indexed corpus shared by the simulated retrievers

use crate::rag::similarity::cosine_similarity;
use bulwark_kernel::{CapabilityResult, Embedder, RetrievedDocument};
use std::collections::HashMap;

/// A document with its precomputed embedding
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    pub content: String,
    pub metadata: HashMap<String, String>,
    pub embedding: Vec<f32>,
}

impl IndexedDocument {
    pub fn new(content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
            embedding,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Brute-force cosine similarity index.
///
/// Built once, then shared read-only (behind an `Arc`) by every retriever
/// tier so they rank the same documents.
#[derive(Debug, Clone, Default)]
pub struct IndexedCorpus {
    documents: Vec<IndexedDocument>,
}

impl IndexedCorpus {
    pub fn new(documents: Vec<IndexedDocument>) -> Self {
        Self { documents }
    }

    /// Embed each text with `embedder` and index it.
    ///
    /// Each document gets a `doc_id` metadata entry holding its position.
    pub async fn index_texts<S: AsRef<str>>(
        embedder: &dyn Embedder,
        texts: &[S],
    ) -> CapabilityResult<Self> {
        let mut documents = Vec::with_capacity(texts.len());
        for (id, text) in texts.iter().enumerate() {
            let text = text.as_ref();
            let embedding = embedder.embed(text).await?;
            documents.push(IndexedDocument::new(text, embedding).with_metadata("doc_id", id.to_string()));
        }
        Ok(Self { documents })
    }

    /// The `top_k` documents most similar to `query`, best first.
    ///
    /// Equal scores keep index order.
    pub fn rank(&self, query: &[f32], top_k: usize) -> Vec<RetrievedDocument> {
        let mut scored: Vec<(usize, f32)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (i, cosine_similarity(query, &doc.embedding)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        scored
            .into_iter()
            .take(top_k)
            .map(|(i, score)| {
                let doc = &self.documents[i];
                RetrievedDocument {
                    content: doc.content.clone(),
                    metadata: doc.metadata.clone(),
                    score,
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> IndexedCorpus {
        IndexedCorpus::new(vec![
            IndexedDocument::new("east", vec![1.0, 0.0]),
            IndexedDocument::new("north", vec![0.0, 1.0]),
            IndexedDocument::new("north-east", vec![1.0, 1.0]),
        ])
    }

    #[test]
    fn test_rank_orders_by_similarity() {
        let results = corpus().rank(&[1.0, 0.1], 3);
        let contents: Vec<_> = results.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["east", "north-east", "north"]);
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[test]
    fn test_rank_truncates_to_top_k() {
        assert_eq!(corpus().rank(&[0.0, 1.0], 1)[0].content, "north");
        assert!(corpus().rank(&[0.0, 1.0], 0).is_empty());
        assert_eq!(corpus().rank(&[0.0, 1.0], 10).len(), 3);
    }

    #[test]
    fn test_ties_keep_index_order() {
        let results = corpus().rank(&[0.0, 0.0], 3);
        let contents: Vec<_> = results.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["east", "north", "north-east"]);
    }
}
