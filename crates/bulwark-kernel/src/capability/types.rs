//! Capability core data types
//!
//! Types that flow between pipeline stages and identify which stage a
//! breaker, chain or health entry belongs to.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The protected capability types of the embed → retrieve → generate
/// pipeline, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// Turns query text into an embedding vector
    Embedder,
    /// Finds documents similar to an embedding
    Retriever,
    /// Produces the final answer text
    Generator,
}

impl ComponentType {
    /// All component types in pipeline order.
    pub const ALL: [ComponentType; 3] = [Self::Embedder, Self::Retriever, Self::Generator];

    /// Stable lowercase name, used as the key in health reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedder => "embedder",
            Self::Retriever => "retriever",
            Self::Generator => "generator",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document returned by a retriever.
///
/// The pipeline never inspects `content`; it only forwards it to the
/// generator stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// The text content of the document
    pub content: String,
    /// Arbitrary metadata (source, title, section, ...)
    pub metadata: HashMap<String, String>,
    /// Similarity score (higher is more similar)
    pub score: f32,
}

impl RetrievedDocument {
    /// Create a new retrieved document with empty metadata
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
            score,
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
