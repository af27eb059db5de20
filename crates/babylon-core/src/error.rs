//! Typed failures that abort an `apply` run before any deploy call.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("Missing required environment variable(s): {}", names.join(", "))]
    MissingEnvironment { names: Vec<String> },

    #[error("Invalid service endpoint '{value}': {reason}")]
    InvalidService { value: String, reason: String },

    #[error("Deployment directory {}: {reason}", path.display())]
    Directory { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
