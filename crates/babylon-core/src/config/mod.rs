//! Configuration for babylon
//!
//! Two sources feed a run:
//! - Environment: required platform prerequisites (endpoint, token, organization)
//! - babylon.toml: optional tuning in the global config directory

pub mod env;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use env::{AZURE_TOKEN_VAR, ORG_NAME_VAR, PlatformEnv, SERVICE_VAR, TOKEN_VAR};
pub use parser::{parse_babylon_toml, parse_babylon_toml_str};
pub use paths::{CONFIG_FILE_NAME, default_config_dir};
pub use schema::{ApplySettings, AzureSettings, BabylonConfig, HttpSettings};
pub use store::ConfigStore;
