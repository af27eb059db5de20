//! Config store for loading babylon.toml.

use std::path::{Path, PathBuf};

use super::{BabylonConfig, parser, paths};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store rooted at the default global config directory.
    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::from_dir(&paths::default_config_dir()?))
    }

    pub fn from_dir(config_dir: &Path) -> Self {
        Self {
            config_path: paths::config_path_in(config_dir),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> anyhow::Result<BabylonConfig> {
        if !self.config_path.exists() {
            return Ok(BabylonConfig::new());
        }
        parser::parse_babylon_toml(&self.config_path)
    }
}
