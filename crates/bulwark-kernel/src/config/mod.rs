//! Configuration loading
//!
//! Loads any serde-deserializable configuration from YAML, TOML, JSON, INI,
//! RON or JSON5, picking the format from the file extension.
//!
//! - `${VAR}` and `$VAR` references are replaced with environment values
//!   before parsing; unknown variables are left untouched
//! - several sources can be layered, later ones overriding earlier ones
//! - environment variables with a prefix can override file values, using
//!   `__` as the nesting separator

use config::{Config as Cfg, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use regex::{Captures, Regex};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

pub use config::FileFormat as Format;


/// Configuration loading error
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

static BRACED_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("braced env var pattern is valid")
});

static BARE_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").expect("bare env var pattern is valid")
});

/// Detect configuration format from file extension
///
/// | Extension | Format |
/// |-----------|--------|
/// | `.yaml`, `.yml` | YAML |
/// | `.toml` | TOML |
/// | `.json` | JSON |
/// | `.ini` | INI |
/// | `.ron` | RON |
/// | `.json5` | JSON5 |
pub fn detect_format(path: impl AsRef<Path>) -> ConfigResult<FileFormat> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat("No file extension found".to_string()))?;

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        "ini" => Ok(FileFormat::Ini),
        "ron" => Ok(FileFormat::Ron),
        "json5" => Ok(FileFormat::Json5),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Substitute environment variables in a string
///
/// `${VAR_NAME}` is resolved first, then bare `$VAR_NAME`. References to
/// unset variables are kept verbatim.
///
/// ```rust,ignore
/// use bulwark_kernel::config::substitute_env_vars;
///
/// // with BULWARK_TOP_K=5 in the environment
/// assert_eq!(substitute_env_vars("top_k = ${BULWARK_TOP_K}"), "top_k = 5");
/// ```
pub fn substitute_env_vars(content: &str) -> String {
    let lookup = |caps: &Captures| std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string());

    let braced = BRACED_VAR.replace_all(content, lookup);
    BARE_VAR.replace_all(&braced, lookup).into_owned()
}

fn read_source(path: &str) -> ConfigResult<File<config::FileSourceString, FileFormat>> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    debug!(path, ?format, "Read configuration source");
    Ok(File::from_str(&substitute_env_vars(&content), format))
}

fn finish<T: DeserializeOwned>(builder: ConfigBuilder<DefaultState>) -> ConfigResult<T> {
    builder
        .build()
        .map_err(|e| ConfigError::Parse(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ConfigError::Serialization(e.to_string()))
}

/// Load configuration from a file
///
/// ```rust,ignore
/// use bulwark_foundation::config::PipelineConfig;
/// use bulwark_kernel::config::load_config;
///
/// let config: PipelineConfig = load_config("pipeline.toml")?;
/// ```
pub fn load_config<T: DeserializeOwned>(path: &str) -> ConfigResult<T> {
    finish(Cfg::builder().add_source(read_source(path)?))
}

/// Load configuration from a string with explicit format
pub fn from_str<T: DeserializeOwned>(content: &str, format: FileFormat) -> ConfigResult<T> {
    finish(Cfg::builder().add_source(File::from_str(&substitute_env_vars(content), format)))
}

/// Merge multiple in-memory configuration sources
///
/// Later sources override earlier ones, key by key.
pub fn merge_configs<T: DeserializeOwned>(sources: &[(&str, FileFormat)]) -> ConfigResult<T> {
    let builder = sources
        .iter()
        .fold(Cfg::builder(), |builder, (content, format)| {
            builder.add_source(File::from_str(&substitute_env_vars(content), *format))
        });
    finish(builder)
}

/// Load configuration from multiple files with later files overriding earlier ones
pub fn load_merged<T: DeserializeOwned>(paths: &[&str]) -> ConfigResult<T> {
    let mut builder = Cfg::builder();
    for path in paths {
        builder = builder.add_source(read_source(path)?);
    }
    finish(builder)
}

/// Load configuration with environment variable overrides
///
/// Variables are named `<PREFIX>_<KEY>` with `__` separating nested keys:
/// `BULWARK_ORCHESTRATOR__TOP_K=5` overrides `orchestrator.top_k`.
pub fn load_with_env<T: DeserializeOwned>(path: &str, env_prefix: &str) -> ConfigResult<T> {
    finish(
        Cfg::builder()
            .add_source(read_source(path)?)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ),
    )
}

/// Render a configuration value as YAML, TOML or JSON
///
/// Other formats are load-only and yield [`ConfigError::UnsupportedFormat`].
pub fn to_string<T: Serialize>(value: &T, format: FileFormat) -> ConfigResult<String> {
    let rendered = match format {
        FileFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        FileFormat::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
        FileFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        other => return Err(ConfigError::UnsupportedFormat(format!("{other:?}"))),
    };
    rendered.map_err(ConfigError::Serialization)
}
