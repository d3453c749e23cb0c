//! Azure OpenAI chat-completions client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::base::HttpClientBase;
use crate::config::{AzureConfig, AzureCredential};
use crate::infrastructure::model::adapter::{MessageAdapter, OpenAIMessage};
use crate::infrastructure::model::traits::ChatClient;
use crate::infrastructure::model::types::{ModelError, ModelResponse};
use crate::types::{ChatMessage, ToolSpec};

/// Client for one Azure OpenAI deployment
#[derive(Clone)]
pub struct AzureOpenAIClient {
    base: HttpClientBase,
    deployment: String,
    api_version: String,
    credential: AzureCredential,
}

impl AzureOpenAIClient {
    pub fn from_config(config: &AzureConfig) -> Result<Self, ModelError> {
        Ok(Self {
            base: HttpClientBase::new(
                "azure-openai".to_string(),
                config.endpoint.clone(),
                config.request_timeout,
            )?,
            deployment: config.model.clone(),
            api_version: config.api_version.clone(),
            credential: config.credential.clone(),
        })
    }

    pub fn completions_url(&self) -> String {
        let path = format!("openai/deployments/{}/chat/completions", self.deployment);
        format!(
            "{}?api-version={}",
            self.base.build_url(&path),
            self.api_version
        )
    }
}

#[async_trait]
impl ChatClient for AzureOpenAIClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ModelResponse, ModelError> {
        let url = self.completions_url();
        let payload = CompletionRequest {
            messages: MessageAdapter::to_openai_format(messages),
            tools: MessageAdapter::tools_to_openai_format(tools),
            stream: false,
        };

        info!(
            deployment = self.deployment.as_str(),
            messages = messages.len(),
            tools = tools.len(),
            credential = self.credential.kind(),
            "Sending request to Azure OpenAI"
        );

        let response: CompletionResponse = self
            .base
            .post_with_credential(&url, &self.credential, &payload)
            .await
            .inspect_err(|err| {
                if err.is_timeout() {
                    warn!(deployment = self.deployment.as_str(), "Azure OpenAI request timed out");
                }
            })?;
        debug!("Received response from Azure OpenAI");

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing choices"))?;

        Ok(ModelResponse::new(
            MessageAdapter::from_openai_message(choice.message.unwrap_or_default()),
            choice.finish_reason,
        ))
    }
}

#[derive(Serialize)]
struct CompletionRequest {
    messages: Vec<Value>,
    // Azure rejects an empty `tools` array.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<OpenAIMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}
