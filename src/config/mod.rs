//! # Configuration
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. built-in defaults ([`crate::constants`])
//! 2. the TOML file (`config/client.toml` unless `--config` is given)
//! 3. environment variables, after `config/.env` has been loaded
//! 4. command line overrides ([`ConfigOverrides`])

pub mod app;
pub mod azure;
pub mod error;
pub mod loader;
pub mod server;

pub use crate::constants::CONFIG_PATH;
pub use app::AppConfig;
pub use azure::{AzureConfig, AzureCredential};
pub use error::ConfigError;
pub use loader::ConfigOverrides;
pub use server::ServerConfig;
