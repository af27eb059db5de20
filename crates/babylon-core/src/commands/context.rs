//! Apply context providing dependency injection for apply operations.
//!
//! ApplyContext bundles the platform prerequisites and the loaded
//! configuration so commands receive them explicitly instead of reading
//! process-wide state.

use std::path::Path;

use crate::config::{BabylonConfig, ConfigStore, PlatformEnv};
use crate::deploy::ApiDeployer;

#[derive(Debug, Clone)]
pub struct ApplyContext {
    env: PlatformEnv,
    config: BabylonConfig,
}

impl ApplyContext {
    pub fn new(env: PlatformEnv, config: BabylonConfig) -> Self {
        Self { env, config }
    }

    /// Build a context from the process environment and the default config
    /// file.
    ///
    /// The environment is checked first: a missing prerequisite fails before
    /// the config file is read.
    pub fn with_defaults() -> anyhow::Result<Self> {
        let env = PlatformEnv::from_env()?;
        let config = ConfigStore::with_defaults()?.load()?;
        Ok(Self::new(env, config))
    }

    /// Like [`ApplyContext::with_defaults`] with an explicit config directory.
    pub fn from_config_dir(env: PlatformEnv, config_dir: &Path) -> anyhow::Result<Self> {
        let config = ConfigStore::from_dir(config_dir).load()?;
        Ok(Self::new(env, config))
    }

    pub fn env(&self) -> &PlatformEnv {
        &self.env
    }

    pub fn config(&self) -> &BabylonConfig {
        &self.config
    }

    /// Create the platform-backed deployer.
    pub fn api_deployer(&self) -> anyhow::Result<ApiDeployer> {
        ApiDeployer::new(&self.env, &self.config)
    }
}
