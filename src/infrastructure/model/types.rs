//! Model types - Response and Error types

use crate::types::{AssistantMessage, ToolCall};
use thiserror::Error;

/// Primary choice of a completion response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

impl ModelResponse {
    pub fn new(message: AssistantMessage, finish_reason: Option<String>) -> Self {
        Self {
            message,
            finish_reason,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(AssistantMessage::Text(content.into()), Some("stop".into()))
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self::new(
            AssistantMessage::from_parts(None, calls),
            Some("tool_calls".into()),
        )
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error calling '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with an error; `message` is the service's own text.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },
    #[error("'{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl ModelError {
    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ModelError::Network { source, .. } if source.is_timeout())
    }
}
