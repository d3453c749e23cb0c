//! Model traits

use super::types::{ModelError, ModelResponse};
use crate::types::{ChatMessage, ToolSpec};
use async_trait::async_trait;

/// Facade over a hosted chat-completion endpoint.
///
/// One call is one request: implementations do not retry, stream, or keep
/// conversation state between calls.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Identifier used in logs and error messages
    fn id(&self) -> &str;

    /// Complete the conversation so far, offering `tools` to the model
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ModelResponse, ModelError>;
}
