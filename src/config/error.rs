use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing Azure OpenAI endpoint - set AZURE_OPENAI_ENDPOINT or [azure].endpoint")]
    MissingEndpoint,

    #[error("Azure OpenAI endpoint '{endpoint}' must start with http:// or https://")]
    InvalidEndpoint { endpoint: String },

    #[error("missing Azure OpenAI model - set AZURE_OPENAI_MODEL or [azure].model")]
    MissingModel,

    #[error(
        "missing Azure OpenAI credential - set AZURE_OPENAI_API_KEY or AZURE_OPENAI_AD_TOKEN"
    )]
    MissingCredential,

    #[error("no MCP server configured - add a [server] section or pass --server-command")]
    MissingServer,

    #[error("max_tool_rounds must be at least 1")]
    InvalidToolRounds,
}
