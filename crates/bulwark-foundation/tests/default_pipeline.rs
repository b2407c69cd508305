//! Integration tests for the simulated pipeline assembled from
//! [`PipelineConfig`].

use std::io::Write;

use bulwark_foundation::config::{PipelineConfig, SimulationConfig};
use bulwark_foundation::rag::FaultProfile;
use bulwark_kernel::ComponentType;

fn all_primaries_failing() -> SimulationConfig {
    SimulationConfig {
        seed: Some(3),
        primary_embedder: FaultProfile::failing(1.0),
        primary_retriever: FaultProfile::failing(1.0),
        primary_generator: FaultProfile::failing(1.0),
        ..SimulationConfig::reliable()
    }
}

#[tokio::test]
async fn reliable_pipeline_answers_from_primary_tiers() {
    let config = PipelineConfig {
        simulation: SimulationConfig::reliable(),
        ..PipelineConfig::default()
    };
    let orchestrator = config.build_orchestrator().await.unwrap();

    let answer = orchestrator
        .query("What happens while a circuit is open?")
        .await;
    assert!(answer.contains("based on 3 source(s)"), "{answer}");

    for entry in orchestrator.get_system_health().values() {
        assert_eq!(entry.state, "closed");
        assert_eq!(entry.failures, 0);
    }
}

#[tokio::test]
async fn failing_primaries_degrade_to_secondary_tiers() {
    let config = PipelineConfig {
        simulation: all_primaries_failing(),
        ..PipelineConfig::default()
    };
    let orchestrator = config.build_orchestrator().await.unwrap();

    for _ in 0..4 {
        let answer = orchestrator.query("Explain half-open probes").await;
        assert!(answer.starts_with("Briefly: "), "{answer}");
    }

    let health = orchestrator.get_system_health();
    for component in ComponentType::ALL {
        let entry = &health[component.as_str()];
        assert_eq!(entry.state, "open");
        assert_eq!(entry.failures, 3);
        assert_eq!(entry.rejected, 1);
    }
}

#[tokio::test]
async fn secondary_embedder_queries_still_retrieve_full_context() {
    let config = PipelineConfig {
        simulation: SimulationConfig {
            primary_embedder: FaultProfile::failing(1.0),
            ..SimulationConfig::reliable()
        },
        ..PipelineConfig::default()
    };
    let orchestrator = config.build_orchestrator().await.unwrap();

    let answer = orchestrator
        .query("What happens while a circuit is open?")
        .await;
    assert!(answer.contains("based on 3 source(s)"), "{answer}");

    let health = orchestrator.get_system_health();
    assert_eq!(health["embedder"].failures, 1);
    assert_eq!(health["retriever"].failures, 0);
}

#[tokio::test]
async fn reduced_retriever_caps_documents() {
    let config = PipelineConfig {
        simulation: SimulationConfig {
            primary_retriever: FaultProfile::failing(1.0),
            ..SimulationConfig::reliable()
        },
        ..PipelineConfig::default()
    };
    let orchestrator = config.build_orchestrator().await.unwrap();

    let answer = orchestrator.query_with_top_k("fallback chains", 5).await;
    assert!(answer.contains("based on 2 source(s)"), "{answer}");
}

#[tokio::test]
async fn pipeline_from_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
        file,
        r#"
embedding_dimension: 16
corpus:
  - "Breakers trip on sustained failure."
  - "Fallbacks keep answering."
orchestrator:
  top_k: 1
simulation:
  seed: 1
  primary_embedder:
    failure_rate: 0.0
  secondary_embedder:
    failure_rate: 0.0
  primary_retriever:
    failure_rate: 0.0
  reduced_retriever:
    failure_rate: 0.0
  primary_generator:
    failure_rate: 0.0
  fallback_generator:
    failure_rate: 0.0
"#
    )
    .unwrap();

    let config = PipelineConfig::load(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.embedding_dimension, 16);
    assert_eq!(config.orchestrator.top_k, 1);

    let orchestrator = config.build_orchestrator().await.unwrap();
    let answer = orchestrator.query("Breakers trip on sustained failure.").await;
    assert!(answer.contains("[1] Breakers trip on sustained failure."), "{answer}");
}
