//! Capability error taxonomy
//!
//! Every failure of a capability call maps onto one of these variants. The
//! circuit breaker treats all of them alike; the variant only tells
//! operators which stage misbehaved.

use super::types::ComponentType;
use thiserror::Error;

/// Capability call result type
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Failure of a single capability call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CapabilityError {
    /// The embedding service could not respond
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The retrieval backend could not respond
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// The generation endpoint could not respond
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// The call exceeded its deadline
    #[error("{component} call timed out after {duration_ms}ms")]
    Timeout {
        component: ComponentType,
        duration_ms: u64,
    },
}

impl CapabilityError {
    /// Build the "unavailable" variant matching a component type.
    pub fn unavailable(component: ComponentType, message: impl Into<String>) -> Self {
        let message = message.into();
        match component {
            ComponentType::Embedder => Self::EmbeddingUnavailable(message),
            ComponentType::Retriever => Self::RetrievalUnavailable(message),
            ComponentType::Generator => Self::GenerationUnavailable(message),
        }
    }

    /// The component type this error belongs to.
    pub fn component(&self) -> ComponentType {
        match self {
            Self::EmbeddingUnavailable(_) => ComponentType::Embedder,
            Self::RetrievalUnavailable(_) => ComponentType::Retriever,
            Self::GenerationUnavailable(_) => ComponentType::Generator,
            Self::Timeout { component, .. } => *component,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_maps_component() {
        let err = CapabilityError::unavailable(ComponentType::Retriever, "index offline");
        assert_eq!(err, CapabilityError::RetrievalUnavailable("index offline".into()));
        assert_eq!(err.component(), ComponentType::Retriever);
    }

    #[test]
    fn test_timeout_display() {
        let err = CapabilityError::Timeout {
            component: ComponentType::Generator,
            duration_ms: 250,
        };
        assert_eq!(err.to_string(), "generator call timed out after 250ms");
        assert_eq!(err.component(), ComponentType::Generator);
    }
}
