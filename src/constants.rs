//! Application constants
//!
//! Single source of truth for paths, environment variable names and defaults.

use std::time::Duration;

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/client.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_MODEL: &str = "AZURE_OPENAI_MODEL";
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const ENV_AD_TOKEN: &str = "AZURE_OPENAI_AD_TOKEN";

pub const DEFAULT_API_VERSION: &str = "2024-10-21";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);

/// One dispatch round per turn: tool results are folded back once and the
/// follow-up answer is final.
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 1;

/// MCP protocol revision sent during `initialize`
pub const PROTOCOL_VERSION: &str = "2025-06-18";
