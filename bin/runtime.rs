//! Runtime utilities
//!
//! This module is only used by the binaries and provides helper code
//! related to runtime configuration.

mod config;
pub mod logging;
mod schemas;

use std::path::Path;

pub use config::Config;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};

/// Prefix for environment variables that override configuration
const ENV_PREFIX: &str = "VIRTUOSO_MCP_";

/// Separator to use when drilling down into nested options in the env figment
const ENV_NESTED_SEPARATOR: &str = "__";

/// Read configuration from environment variables only (when no config file is provided)
#[allow(clippy::result_large_err)]
pub fn read_config_from_env() -> Result<Config, figment::Error> {
    Figment::new()
        .join(Env::prefixed(ENV_PREFIX).split(ENV_NESTED_SEPARATOR))
        .extract()
}

/// Read in a config from a YAML file, filling in any missing values from the environment.
#[allow(clippy::result_large_err)]
pub fn read_config(yaml_path: impl AsRef<Path>) -> Result<Config, figment::Error> {
    Figment::new()
        .join(Env::prefixed(ENV_PREFIX).split(ENV_NESTED_SEPARATOR))
        .join(Yaml::file_exact(yaml_path.as_ref()))
        .extract()
}
