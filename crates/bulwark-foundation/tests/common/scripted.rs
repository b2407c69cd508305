//! Scripted capability doubles for `bulwark-foundation` integration tests.
//!
//! Each double pops its next outcome from a FIFO script and falls back to a
//! fixed default once the script runs dry. Every call is counted, so tests
//! can assert whether a breaker actually invoked the primary.
//!
//! ```rust,ignore
//! let embedder = ScriptedEmbedder::builder("flaky", 4)
//!     .fail()
//!     .succeed()
//!     .default_fail()
//!     .build();
//! ```

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use bulwark_kernel::{
    CapabilityError, CapabilityResult, ComponentType, Embedder, Generator, RetrievedDocument,
    Retriever,
};

// ─────────────────────────────────────────────────────────────────────────────
// Script
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Succeed,
    Fail,
    /// Sleep, then succeed
    Hang(Duration),
}

#[derive(Debug)]
struct Script {
    steps: VecDeque<Step>,
    default: Step,
    calls: usize,
}

impl Script {
    fn next(&mut self) -> Step {
        self.calls += 1;
        self.steps.pop_front().unwrap_or(self.default)
    }
}

/// Shared call counter and script behind every double
#[derive(Debug, Clone)]
pub struct Handle(Arc<Mutex<Script>>);

impl Handle {
    fn new(steps: VecDeque<Step>, default: Step) -> Self {
        Self(Arc::new(Mutex::new(Script {
            steps,
            default,
            calls: 0,
        })))
    }

    pub fn calls(&self) -> usize {
        self.0.lock().expect("script mutex poisoned").calls
    }

    async fn run(&self, component: ComponentType, name: &str) -> CapabilityResult<()> {
        let step = self.0.lock().expect("script mutex poisoned").next();
        match step {
            Step::Succeed => Ok(()),
            Step::Fail => Err(CapabilityError::unavailable(
                component,
                format!("{name} scripted failure"),
            )),
            Step::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(())
            }
        }
    }
}

/// Builder shared by all three doubles
#[derive(Debug)]
pub struct ScriptBuilder<T> {
    steps: VecDeque<Step>,
    default: Step,
    make: T,
}

impl<T> ScriptBuilder<T> {
    pub fn succeed(mut self) -> Self {
        self.steps.push_back(Step::Succeed);
        self
    }

    pub fn fail(mut self) -> Self {
        self.steps.push_back(Step::Fail);
        self
    }

    pub fn fail_times(mut self, n: usize) -> Self {
        self.steps.extend(std::iter::repeat_n(Step::Fail, n));
        self
    }

    pub fn hang(mut self, duration: Duration) -> Self {
        self.steps.push_back(Step::Hang(duration));
        self
    }

    /// Fail every call once the script is exhausted
    pub fn default_fail(mut self) -> Self {
        self.default = Step::Fail;
        self
    }

    fn handle(&self) -> Handle {
        Handle::new(self.steps.clone(), self.default)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Embedder
// ─────────────────────────────────────────────────────────────────────────────

/// Returns `[value; dimension]` on success
#[derive(Debug)]
pub struct ScriptedEmbedder {
    name: String,
    dimension: usize,
    value: f32,
    handle: Handle,
}

#[derive(Debug)]
pub struct EmbedderSpec {
    name: String,
    dimension: usize,
    value: f32,
}

impl ScriptedEmbedder {
    pub fn builder(name: &str, dimension: usize) -> ScriptBuilder<EmbedderSpec> {
        ScriptBuilder {
            steps: VecDeque::new(),
            default: Step::Succeed,
            make: EmbedderSpec {
                name: name.to_string(),
                dimension,
                value: 1.0,
            },
        }
    }

    pub fn always_failing(name: &str, dimension: usize) -> Arc<Self> {
        Self::builder(name, dimension).default_fail().build()
    }

    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }
}

impl ScriptBuilder<EmbedderSpec> {
    pub fn value(mut self, value: f32) -> Self {
        self.make.value = value;
        self
    }

    pub fn build(self) -> Arc<ScriptedEmbedder> {
        let handle = self.handle();
        Arc::new(ScriptedEmbedder {
            name: self.make.name,
            dimension: self.make.dimension,
            value: self.make.value,
            handle,
        })
    }
}

#[async_trait]
impl Embedder for ScriptedEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, _text: &str) -> CapabilityResult<Vec<f32>> {
        self.handle.run(ComponentType::Embedder, &self.name).await?;
        Ok(vec![self.value; self.dimension])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Retriever
// ─────────────────────────────────────────────────────────────────────────────

/// Returns `top_k` documents named `"{name}-{i}"` on success
#[derive(Debug)]
pub struct ScriptedRetriever {
    name: String,
    handle: Handle,
    last_query: Mutex<Option<Vec<f32>>>,
}

impl ScriptedRetriever {
    pub fn builder(name: &str) -> ScriptBuilder<String> {
        ScriptBuilder {
            steps: VecDeque::new(),
            default: Step::Succeed,
            make: name.to_string(),
        }
    }

    pub fn always_failing(name: &str) -> Arc<Self> {
        Self::builder(name).default_fail().build()
    }

    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// The embedding passed to the most recent call, successful or not
    pub fn last_query(&self) -> Option<Vec<f32>> {
        self.last_query.lock().expect("query mutex poisoned").clone()
    }
}

impl ScriptBuilder<String> {
    pub fn build(self) -> Arc<ScriptedRetriever> {
        let handle = self.handle();
        Arc::new(ScriptedRetriever {
            name: self.make,
            handle,
            last_query: Mutex::new(None),
        })
    }
}

#[async_trait]
impl Retriever for ScriptedRetriever {
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> CapabilityResult<Vec<RetrievedDocument>> {
        *self.last_query.lock().expect("query mutex poisoned") = Some(query_embedding.to_vec());
        self.handle.run(ComponentType::Retriever, &self.name).await?;
        Ok((0..top_k)
            .map(|i| RetrievedDocument::new(format!("{}-{i}", self.name), 1.0 - i as f32 * 0.1))
            .collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Generator
// ─────────────────────────────────────────────────────────────────────────────

/// Answers `"{name}: {prompt} ({n} docs)"` on success
#[derive(Debug)]
pub struct ScriptedGenerator {
    name: String,
    handle: Handle,
}

#[derive(Debug)]
pub struct GeneratorSpec(String);

impl ScriptedGenerator {
    pub fn builder(name: &str) -> ScriptBuilder<GeneratorSpec> {
        ScriptBuilder {
            steps: VecDeque::new(),
            default: Step::Succeed,
            make: GeneratorSpec(name.to_string()),
        }
    }

    pub fn always_failing(name: &str) -> Arc<Self> {
        Self::builder(name).default_fail().build()
    }

    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }
}

impl ScriptBuilder<GeneratorSpec> {
    pub fn build(self) -> Arc<ScriptedGenerator> {
        let handle = self.handle();
        Arc::new(ScriptedGenerator {
            name: self.make.0,
            handle,
        })
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &str,
        context: Option<&[RetrievedDocument]>,
    ) -> CapabilityResult<String> {
        self.handle.run(ComponentType::Generator, &self.name).await?;
        let n = context.map_or(0, <[RetrievedDocument]>::len);
        Ok(format!("{}: {prompt} ({n} docs)", self.name))
    }
}
