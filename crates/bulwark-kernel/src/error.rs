//! Crate-level error types for `bulwark-kernel`.
//!
//! [`KernelError`] composes the errors of every kernel sub-module and is
//! carried inside an [`error_stack::Report`] so callers can attach context
//! while the error travels up.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bulwark_kernel::error::{KernelError, KernelResult};
//! use error_stack::ResultExt;
//!
//! fn load() -> KernelResult<PipelineConfig> {
//!     bulwark_kernel::config::load_config("pipeline.toml")
//!         .map_err(KernelError::from)
//!         .map_err(error_stack::Report::new)
//!         .attach("loading pipeline.toml")
//! }
//! ```

use crate::capability::CapabilityError;
use thiserror::Error;

/// Crate-level error type for `bulwark-kernel`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    /// A capability call failed
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// A configuration-related error (requires the `config` feature).
    #[cfg(feature = "config")]
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// An internal / untyped error described by a message string.
    #[error("{0}")]
    Internal(String),
}

/// Convenience result alias using [`error_stack::Report`].
pub type KernelResult<T> = Result<T, error_stack::Report<KernelError>>;
