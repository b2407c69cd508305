//! Bulwark demo harness
//!
//! Builds the tiered pipeline from a config file (or the defaults), sends a
//! batch of queries through it and prints the health report as JSON.
//!
//! ```bash
//! RUST_LOG=bulwark=debug bulwark-demo --fail-primaries -n 12
//! ```

mod cli;

use anyhow::anyhow;
use bulwark_foundation::config::PipelineConfig;
use bulwark_foundation::rag::FaultProfile;
use bulwark_kernel::config::{self, Format};
use clap::Parser;
use cli::{Cli, DumpFormat};
use tracing::info;
use tracing_subscriber::EnvFilter;

const QUERIES: [&str; 5] = [
    "What does a circuit breaker do?",
    "What happens while a circuit is open?",
    "How does a half-open probe work?",
    "Why keep a fallback chain?",
    "How are documents ranked?",
];

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let default = if cli.verbose { "bulwark=debug" } else { "bulwark=info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match (&cli.config, &cli.env_prefix) {
        (Some(path), Some(prefix)) => {
            let path = path.to_string_lossy();
            PipelineConfig::load_with_env(&path, prefix).map_err(|report| anyhow!("{report:?}"))?
        }
        (Some(path), None) => {
            PipelineConfig::load(&path.to_string_lossy()).map_err(|report| anyhow!("{report:?}"))?
        }
        (None, _) => PipelineConfig::default(),
    };

    if let Some(top_k) = cli.top_k {
        config.orchestrator.top_k = top_k;
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }
    if cli.fail_primaries {
        let sim = &mut config.simulation;
        sim.primary_embedder = FaultProfile::failing(1.0);
        sim.primary_retriever = FaultProfile::failing(1.0);
        sim.primary_generator = FaultProfile::failing(1.0);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let pipeline = load_config(&cli)?;

    if let Some(format) = cli.dump_config {
        let format = match format {
            DumpFormat::Yaml => Format::Yaml,
            DumpFormat::Toml => Format::Toml,
            DumpFormat::Json => Format::Json,
        };
        println!("{}", config::to_string(&pipeline, format)?);
        return Ok(());
    }

    let orchestrator = pipeline
        .build_orchestrator()
        .await
        .map_err(|report| anyhow!("{report:?}"))?;
    info!(queries = cli.queries, top_k = orchestrator.top_k(), "Running queries");

    for (i, query) in QUERIES.iter().cycle().take(cli.queries).enumerate() {
        let answer = orchestrator.query(query).await;
        if cli.verbose {
            println!("[{}] {query}\n    {}", i + 1, answer.replace('\n', "\n    "));
        }
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&orchestrator.get_system_health())?
    );
    Ok(())
}
