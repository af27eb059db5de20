//! Configuration schema for babylon.toml
//!
//! Every key is optional; a missing file or table yields the defaults below.
//! Required platform prerequisites never come from this file, see
//! [`super::env::PlatformEnv`].

use serde::Deserialize;

use crate::error::ApplyError;

/// Number of leading lines read to classify a manifest.
pub const DEFAULT_HEADER_LINES: usize = 7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_STATIC_SITES_API_VERSION: &str = "2022-03-01";

/// Root configuration structure for babylon.toml
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct BabylonConfig {
    #[serde(default)]
    pub apply: ApplySettings,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub azure: AzureSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApplySettings {
    /// Classification window, in lines from the top of each manifest
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,

    /// Keep deploying remaining manifests after a failure
    #[serde(default)]
    pub keep_going: bool,
}

impl Default for ApplySettings {
    fn default() -> Self {
        Self {
            header_lines: DEFAULT_HEADER_LINES,
            keep_going: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Honour HTTP_PROXY / HTTPS_PROXY / NO_PROXY
    #[serde(default = "default_true")]
    pub use_system_proxy: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            use_system_proxy: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AzureSettings {
    /// Azure Resource Manager base URL (static web apps)
    #[serde(default = "default_arm_endpoint")]
    pub arm_endpoint: String,

    #[serde(default = "default_static_sites_api_version")]
    pub static_sites_api_version: String,
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self {
            arm_endpoint: default_arm_endpoint(),
            static_sites_api_version: default_static_sites_api_version(),
        }
    }
}

fn default_header_lines() -> usize {
    DEFAULT_HEADER_LINES
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("babylon/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

fn default_arm_endpoint() -> String {
    DEFAULT_ARM_ENDPOINT.to_string()
}

fn default_static_sites_api_version() -> String {
    DEFAULT_STATIC_SITES_API_VERSION.to_string()
}

impl BabylonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ApplyError> {
        if self.apply.header_lines == 0 {
            return Err(ApplyError::InvalidConfig(
                "apply.header_lines must be at least 1".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ApplyError::InvalidConfig(
                "http.timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Err(e) = url::Url::parse(&self.azure.arm_endpoint) {
            return Err(ApplyError::InvalidConfig(format!(
                "azure.arm_endpoint '{}' is not a valid URL: {}",
                self.azure.arm_endpoint, e
            )));
        }
        Ok(())
    }
}
