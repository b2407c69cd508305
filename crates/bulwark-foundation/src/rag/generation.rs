//! Simulated generation tiers
//!
//! [`PrimaryGenerator`] uses every retrieved document, [`FallbackGenerator`]
//! only the best one, and [`TemplateGenerator`] answers with canned text
//! keyed on whether any context was present. The template tier never fails.

use crate::rag::fault::FaultInjector;
use async_trait::async_trait;
use bulwark_kernel::{CapabilityResult, ComponentType, Generator, RetrievedDocument};
use std::fmt::Write;

/// Longest excerpt the fallback tier quotes, in characters
pub const FALLBACK_EXCERPT_CHARS: usize = 200;

/// Canned answer when context was retrieved
pub const TEMPLATE_WITH_CONTEXT: &str =
    "I found some related information, but I can't give a detailed answer right now. Please try again shortly.";

/// Canned answer without context
pub const TEMPLATE_WITHOUT_CONTEXT: &str =
    "I'm unable to give a detailed answer right now. Please try again shortly.";

fn non_empty(context: Option<&[RetrievedDocument]>) -> Option<&[RetrievedDocument]> {
    context.filter(|docs| !docs.is_empty())
}

/// Full answer citing every context document
#[derive(Debug)]
pub struct PrimaryGenerator {
    faults: FaultInjector,
}

impl PrimaryGenerator {
    pub fn new(faults: FaultInjector) -> Self {
        Self { faults }
    }

    pub fn reliable() -> Self {
        Self::new(FaultInjector::reliable())
    }
}

#[async_trait]
impl Generator for PrimaryGenerator {
    fn name(&self) -> &str {
        "primary-generator"
    }

    async fn generate(
        &self,
        prompt: &str,
        context: Option<&[RetrievedDocument]>,
    ) -> CapabilityResult<String> {
        self.faults
            .inject(ComponentType::Generator, self.name())
            .await?;

        let Some(docs) = non_empty(context) else {
            return Ok(format!(
                "No reference material matched \"{prompt}\"; answering from general knowledge."
            ));
        };

        let mut answer = format!(
            "Answer to \"{prompt}\" based on {} source(s):",
            docs.len()
        );
        for (i, doc) in docs.iter().enumerate() {
            let _ = write!(answer, "\n[{}] {}", i + 1, doc.content);
        }
        Ok(answer)
    }
}

/// Short answer quoting only the best document
#[derive(Debug)]
pub struct FallbackGenerator {
    faults: FaultInjector,
}

impl FallbackGenerator {
    pub fn new(faults: FaultInjector) -> Self {
        Self { faults }
    }

    pub fn reliable() -> Self {
        Self::new(FaultInjector::reliable())
    }
}

#[async_trait]
impl Generator for FallbackGenerator {
    fn name(&self) -> &str {
        "fallback-generator"
    }

    async fn generate(
        &self,
        prompt: &str,
        context: Option<&[RetrievedDocument]>,
    ) -> CapabilityResult<String> {
        self.faults
            .inject(ComponentType::Generator, self.name())
            .await?;

        match non_empty(context).and_then(|docs| docs.first()) {
            Some(best) => {
                let excerpt: String = best.content.chars().take(FALLBACK_EXCERPT_CHARS).collect();
                Ok(format!("Briefly: {excerpt}"))
            }
            None => Ok(format!("A short answer to \"{prompt}\" is not available from our sources.")),
        }
    }
}

/// Static canned text; never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

#[async_trait]
impl Generator for TemplateGenerator {
    fn name(&self) -> &str {
        "template-generator"
    }

    async fn generate(
        &self,
        _prompt: &str,
        context: Option<&[RetrievedDocument]>,
    ) -> CapabilityResult<String> {
        Ok(match non_empty(context) {
            Some(_) => TEMPLATE_WITH_CONTEXT,
            None => TEMPLATE_WITHOUT_CONTEXT,
        }
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::fault::FaultProfile;
    use bulwark_kernel::CapabilityError;

    fn docs() -> Vec<RetrievedDocument> {
        vec![
            RetrievedDocument::new("Breakers stop calls to failing services.", 0.9),
            RetrievedDocument::new("Fallbacks degrade gracefully.", 0.7),
        ]
    }

    #[tokio::test]
    async fn test_primary_cites_all_context() {
        let docs = docs();
        let answer = PrimaryGenerator::reliable()
            .generate("what is a breaker?", Some(&docs))
            .await
            .unwrap();
        assert!(answer.contains("2 source(s)"));
        assert!(answer.contains("[1] Breakers stop calls"));
        assert!(answer.contains("[2] Fallbacks degrade"));
    }

    #[tokio::test]
    async fn test_primary_without_context() {
        let answer = PrimaryGenerator::reliable()
            .generate("anything", Some(&[]))
            .await
            .unwrap();
        assert!(answer.contains("general knowledge"));
    }

    #[tokio::test]
    async fn test_fallback_uses_only_best_document() {
        let docs = docs();
        let answer = FallbackGenerator::reliable()
            .generate("q", Some(&docs))
            .await
            .unwrap();
        assert!(answer.contains("Breakers stop calls"));
        assert!(!answer.contains("Fallbacks degrade"));
    }

    #[tokio::test]
    async fn test_fallback_truncates_on_char_boundary() {
        let long = vec![RetrievedDocument::new("é".repeat(500), 1.0)];
        let answer = FallbackGenerator::reliable()
            .generate("q", Some(&long))
            .await
            .unwrap();
        assert_eq!(answer.chars().filter(|c| *c == 'é').count(), FALLBACK_EXCERPT_CHARS);
    }

    #[tokio::test]
    async fn test_template_keyed_on_context() {
        let docs = docs();
        assert_eq!(
            TemplateGenerator.generate("q", Some(&docs)).await.unwrap(),
            TEMPLATE_WITH_CONTEXT
        );
        assert_eq!(
            TemplateGenerator.generate("q", None).await.unwrap(),
            TEMPLATE_WITHOUT_CONTEXT
        );
        assert_eq!(
            TemplateGenerator.generate("q", Some(&[])).await.unwrap(),
            TEMPLATE_WITHOUT_CONTEXT
        );
    }

    #[tokio::test]
    async fn test_failure_is_generation_unavailable() {
        let generator = FallbackGenerator::new(FaultInjector::new(FaultProfile::failing(1.0)));
        let err = generator.generate("q", None).await.unwrap_err();
        assert!(matches!(err, CapabilityError::GenerationUnavailable(_)));
    }
}
