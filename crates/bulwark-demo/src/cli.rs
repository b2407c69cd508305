//! Command-line arguments

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Drive the simulated resilient pipeline and report its health
#[derive(Debug, Parser)]
#[command(name = "bulwark-demo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (yaml, toml, json, ini, ron, json5)
    #[arg(short = 'c', long, env = "BULWARK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Prefix of environment variables overriding the config file
    #[arg(long, requires = "config")]
    pub env_prefix: Option<String>,

    /// Number of queries to run
    #[arg(short = 'n', long, default_value_t = 20)]
    pub queries: usize,

    /// Documents to retrieve per query, overriding the config
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Seed for reproducible simulated failures
    #[arg(long)]
    pub seed: Option<u64>,

    /// Make every primary tier fail on every call
    #[arg(long)]
    pub fail_primaries: bool,

    /// Print each answer
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Print the effective configuration in this format and exit
    #[arg(long, value_enum)]
    pub dump_config: Option<DumpFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    Yaml,
    Toml,
    Json,
}
