use super::azure::AzureConfig;
use super::error::ConfigError;
use super::loader::ConfigOverrides;
use super::server::ServerConfig;
use std::path::Path;

/// Fully resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub azure: AzureConfig,
    pub server: ServerConfig,
    pub system_prompt: Option<String>,
    pub max_tool_rounds: u32,
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, &ConfigOverrides::default())
    }

    /// Load configuration and apply command line overrides on top
    pub fn load_with(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        super::loader::load_config(path, overrides)
    }
}
