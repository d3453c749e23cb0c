use super::azure::{AzureConfig, AzureCredential};
use super::error::ConfigError;
use super::server::{RawServer, ServerConfig};
use crate::constants::{
    CONFIG_PATH, DEFAULT_API_VERSION, DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_REQUEST_TIMEOUT,
    ENV_AD_TOKEN, ENV_API_KEY, ENV_API_VERSION, ENV_ENDPOINT, ENV_MODEL, ENV_PATH,
};
use dotenvy::from_filename;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, warn};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    pub system_prompt: Option<String>,
    pub max_tool_rounds: Option<u32>,
    #[serde(default)]
    pub azure: RawAzure,
    pub server: Option<RawServer>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawAzure {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_version: Option<String>,
    pub api_key: Option<String>,
    pub ad_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Values supplied on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub max_tool_rounds: Option<u32>,
    pub server_command: Option<String>,
    pub server_args: Vec<String>,
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

/// Load and validate configuration from a file path.
///
/// A missing file is only an error when the path was given explicitly; the
/// default location is optional because everything required can come from
/// the environment.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<super::AppConfig, ConfigError> {
    ensure_env_loaded();
    let raw = match path {
        Some(path) => read_config(path)?,
        None => match read_config(Path::new(CONFIG_PATH)) {
            Err(ConfigError::NotFound { path }) => {
                debug!(path = %path.display(), "No configuration file; using environment only");
                RawConfig::default()
            }
            other => other?,
        },
    };
    validate_and_build(raw, overrides)
}

fn read_config(path: &Path) -> Result<RawConfig, ConfigError> {
    debug!(path = %path.display(), "Reading client configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn validate_and_build(
    parsed: RawConfig,
    overrides: &ConfigOverrides,
) -> Result<super::AppConfig, ConfigError> {
    let RawConfig {
        system_prompt,
        max_tool_rounds,
        azure,
        server,
    } = parsed;

    let endpoint = pick(overrides.endpoint.clone(), ENV_ENDPOINT, azure.endpoint)
        .ok_or(ConfigError::MissingEndpoint)?;
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(ConfigError::InvalidEndpoint { endpoint });
    }
    let model =
        pick(overrides.model.clone(), ENV_MODEL, azure.model).ok_or(ConfigError::MissingModel)?;
    let api_version = pick(None, ENV_API_VERSION, azure.api_version)
        .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

    let credential = match pick(None, ENV_API_KEY, azure.api_key) {
        Some(key) => AzureCredential::ApiKey(key),
        None => pick(None, ENV_AD_TOKEN, azure.ad_token)
            .map(AzureCredential::BearerToken)
            .ok_or(ConfigError::MissingCredential)?,
    };

    let server = match overrides.server_command.as_deref().and_then(non_empty) {
        Some(command) => ServerConfig::new("cli", command).with_args(overrides.server_args.clone()),
        None => server.map(ServerConfig::from).ok_or(ConfigError::MissingServer)?,
    };

    let max_tool_rounds = overrides
        .max_tool_rounds
        .or(max_tool_rounds)
        .unwrap_or(DEFAULT_MAX_TOOL_ROUNDS);
    if max_tool_rounds == 0 {
        return Err(ConfigError::InvalidToolRounds);
    }

    let system_prompt = overrides
        .system_prompt
        .clone()
        .or(system_prompt)
        .and_then(|prompt| non_empty(&prompt));

    Ok(super::AppConfig {
        azure: AzureConfig {
            endpoint,
            model,
            api_version,
            credential,
            request_timeout: azure
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        },
        server,
        system_prompt,
        max_tool_rounds,
    })
}

/// CLI value, then environment variable, then file value. Blank values count
/// as absent at every layer.
fn pick(cli: Option<String>, env_key: &str, file: Option<String>) -> Option<String> {
    cli.as_deref()
        .and_then(non_empty)
        .or_else(|| env::var(env_key).ok().as_deref().and_then(non_empty))
        .or_else(|| file.as_deref().and_then(expand).as_deref().and_then(non_empty))
}

fn expand(value: &str) -> Option<String> {
    match shellexpand::full(value) {
        Ok(expanded) => Some(expanded.into_owned()),
        Err(err) => {
            warn!(value, %err, "Failed to expand configuration value");
            None
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
