use std::fmt;
use std::time::Duration;

/// Connection settings for an Azure OpenAI deployment.
#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub endpoint: String,
    /// Deployment name; Azure routes by deployment rather than model id.
    pub model: String,
    pub api_version: String,
    pub credential: AzureCredential,
    pub request_timeout: Duration,
}

/// How requests authenticate against the deployment.
#[derive(Clone, PartialEq, Eq)]
pub enum AzureCredential {
    /// Resource key sent in the `api-key` header.
    ApiKey(String),
    /// Pre-issued Entra ID access token for the
    /// `https://cognitiveservices.azure.com/.default` scope.
    BearerToken(String),
}

impl AzureCredential {
    pub fn kind(&self) -> &'static str {
        match self {
            AzureCredential::ApiKey(_) => "api-key",
            AzureCredential::BearerToken(_) => "bearer-token",
        }
    }
}

// Secrets never reach the logs through `{:?}`.
impl fmt::Debug for AzureCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AzureCredential::{}(***)", self.kind())
    }
}
