//! Babylon Core Library
//!
//! Deploys Cosmo Tech platform resources described by a directory of YAML
//! manifests, classified by `kind` and dispatched in dependency order.

pub mod commands;
pub mod config;
pub mod deploy;
pub mod error;
pub mod manifest;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Commands
    pub use crate::commands::{ApplyCommand, ApplyContext, ApplyOptions, ApplyPlan};

    // Configuration
    pub use crate::config::{BabylonConfig, ConfigStore, PlatformEnv};

    // Deploy
    pub use crate::deploy::{
        ApiDeployer, ApplyReport, DeployAction, DeployedResource, Deployer, DeploymentBatch,
        Dispatcher, FailurePolicy, FileOutcome, OutcomeStatus,
    };

    // Manifests
    pub use crate::manifest::{Manifest, SkipReason, SkippedManifest};

    // Errors
    pub use crate::error::ApplyError;

    // Types
    pub use crate::types::ResourceKind;
}
