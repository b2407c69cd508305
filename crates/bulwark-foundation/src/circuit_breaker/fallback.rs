//! Fallback Strategy
//!
//! Ordered chains of interchangeable capability implementations, one chain
//! per component type. Index 0 is the primary; later entries are
//! progressively more degraded.

use bulwark_kernel::{CapabilityResult, ComponentType, Embedder, Generator, Retriever};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::state::guarded_call;

/// One capability implementation of any type
#[derive(Clone)]
pub enum Capability {
    Embedder(Arc<dyn Embedder>),
    Retriever(Arc<dyn Retriever>),
    Generator(Arc<dyn Generator>),
}

impl Capability {
    /// The component type this implementation serves
    pub fn component_type(&self) -> ComponentType {
        match self {
            Self::Embedder(_) => ComponentType::Embedder,
            Self::Retriever(_) => ComponentType::Retriever,
            Self::Generator(_) => ComponentType::Generator,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Embedder(e) => e.name(),
            Self::Retriever(r) => r.name(),
            Self::Generator(g) => g.name(),
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.component_type(), self.name())
    }
}

/// Per-component fallback chains.
///
/// Built once and immutable afterwards. Nothing is validated: callers are
/// expected to put the primary at index 0 of every chain they use.
///
/// ```rust,ignore
/// let strategy = FallbackStrategy::builder()
///     .embedder(primary_embedder)
///     .embedder(Arc::new(CachedEmbedder::new(384)))
///     .retriever(primary_retriever)
///     .retriever(Arc::new(NoneRetriever))
///     .generator(primary_generator)
///     .generator(Arc::new(TemplateGenerator))
///     .build();
/// ```
#[derive(Clone, Default)]
pub struct FallbackStrategy {
    fallback_chains: HashMap<ComponentType, Vec<Capability>>,
}

impl FallbackStrategy {
    /// Create from pre-built chains
    pub fn new(fallback_chains: HashMap<ComponentType, Vec<Capability>>) -> Self {
        Self { fallback_chains }
    }

    pub fn builder() -> FallbackBuilder {
        FallbackBuilder::default()
    }

    /// The ordered chain for a component type; empty if unconfigured
    pub fn get_fallback_chain(&self, component: ComponentType) -> &[Capability] {
        self.fallback_chains
            .get(&component)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The embedder chain, primary first
    pub fn embedder_chain(&self) -> Vec<Arc<dyn Embedder>> {
        self.get_fallback_chain(ComponentType::Embedder)
            .iter()
            .filter_map(|c| match c {
                Capability::Embedder(e) => Some(Arc::clone(e)),
                _ => None,
            })
            .collect()
    }

    /// The retriever chain, primary first
    pub fn retriever_chain(&self) -> Vec<Arc<dyn Retriever>> {
        self.get_fallback_chain(ComponentType::Retriever)
            .iter()
            .filter_map(|c| match c {
                Capability::Retriever(r) => Some(Arc::clone(r)),
                _ => None,
            })
            .collect()
    }

    /// The generator chain, primary first
    pub fn generator_chain(&self) -> Vec<Arc<dyn Generator>> {
        self.get_fallback_chain(ComponentType::Generator)
            .iter()
            .filter_map(|c| match c {
                Capability::Generator(g) => Some(Arc::clone(g)),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Debug for FallbackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for component in ComponentType::ALL {
            map.entry(&component, &self.get_fallback_chain(component));
        }
        map.finish()
    }
}

/// Builder appending implementations to each chain in call order
#[derive(Default)]
pub struct FallbackBuilder {
    fallback_chains: HashMap<ComponentType, Vec<Capability>>,
}

impl FallbackBuilder {
    fn push(mut self, capability: Capability) -> Self {
        self.fallback_chains
            .entry(capability.component_type())
            .or_default()
            .push(capability);
        self
    }

    pub fn embedder(self, embedder: Arc<dyn Embedder>) -> Self {
        self.push(Capability::Embedder(embedder))
    }

    pub fn retriever(self, retriever: Arc<dyn Retriever>) -> Self {
        self.push(Capability::Retriever(retriever))
    }

    pub fn generator(self, generator: Arc<dyn Generator>) -> Self {
        self.push(Capability::Generator(generator))
    }

    pub fn build(self) -> FallbackStrategy {
        FallbackStrategy::new(self.fallback_chains)
    }
}

/// Something with a tier name that can be logged while walking a chain
pub trait Tier {
    fn tier_name(&self) -> &str;
}

impl Tier for Arc<dyn Embedder> {
    fn tier_name(&self) -> &str {
        self.name()
    }
}

impl Tier for Arc<dyn Retriever> {
    fn tier_name(&self) -> &str {
        self.name()
    }
}

impl Tier for Arc<dyn Generator> {
    fn tier_name(&self) -> &str {
        self.name()
    }
}

/// Try each tier in order and return the first success.
///
/// An error, a panic, or an attempt outlasting `call_timeout` fails that
/// tier; failures are logged and skipped. `None` means every tier failed
/// (or the slice was empty); the caller decides the terminal default.
pub async fn walk_chain<C, T, F, Fut>(
    component: ComponentType,
    chain: &[C],
    call_timeout: Option<Duration>,
    mut attempt: F,
) -> Option<T>
where
    C: Tier + Clone,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = CapabilityResult<T>>,
{
    for tier in chain {
        match guarded_call(component, call_timeout, attempt(tier.clone())).await {
            Ok(value) => {
                debug!(%component, tier = tier.tier_name(), "Fallback tier served request");
                return Some(value);
            }
            Err(reason) => {
                warn!(%component, tier = tier.tier_name(), %reason, "Fallback tier failed");
            }
        }
    }
    None
}
