//! Per-directory handler configuration.
//!
//! Chains declared here are templates. Requests never run them directly;
//! they run deep copies (see [`crate::dispatch`]).

mod dir_config;
#[cfg(feature = "serde")]
mod file;
mod options;
mod scope;


use thiserror::Error;

pub use dir_config::{DirConfig, DirConfigBuilder};
pub use options::Options;
pub use scope::ConfigScope;

use crate::hlist::InvalidPhase;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    InvalidPhase(#[from] InvalidPhase),

    #[error("{0} requires at least one handler")]
    EmptyHandler(&'static str),

    #[error("Directory section has no path")]
    MissingDirectory,

    #[error("Invalid configuration for '{field}': {reason}")]
    Invalid { field: String, reason: String },

    #[cfg(feature = "serde")]
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
