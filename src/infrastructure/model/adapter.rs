//! Message adapters - convert between domain types and the OpenAI wire format

use crate::types::{AssistantMessage, ChatMessage, ToolCall, ToolSpec};
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Assistant message as it appears in a completion choice.
#[derive(Debug, Default, Deserialize)]
pub struct OpenAIMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIToolCall {
    pub id: String,
    pub function: OpenAIFunctionCall,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// Adapter for converting messages to and from the OpenAI chat format
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert history into the `messages` array of a completion request
    pub fn to_openai_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages.iter().map(Self::message_to_openai).collect()
    }

    fn message_to_openai(message: &ChatMessage) -> Value {
        let role = message.role().as_str();
        match message {
            ChatMessage::System { content } | ChatMessage::User { content } => json!({
                "role": role,
                "content": content,
            }),
            ChatMessage::Assistant(AssistantMessage::Text(content)) => json!({
                "role": role,
                "content": content,
            }),
            ChatMessage::Assistant(AssistantMessage::ToolCalls { content, calls }) => json!({
                "role": role,
                "content": content,
                "tool_calls": calls.iter().map(Self::tool_call_to_openai).collect::<Vec<_>>(),
            }),
            ChatMessage::Tool {
                tool_call_id,
                content,
            } => json!({
                "role": role,
                "tool_call_id": tool_call_id,
                "content": content,
            }),
        }
    }

    fn tool_call_to_openai(call: &ToolCall) -> Value {
        json!({
            "id": call.id,
            "type": "function",
            "function": {
                "name": call.name,
                "arguments": call.arguments,
            }
        })
    }

    /// Convert tool specs into the `tools` array of a completion request
    pub fn tools_to_openai_format(tools: &[ToolSpec]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                let mut function = Map::new();
                function.insert("name".to_string(), Value::String(tool.name.clone()));
                if let Some(description) = &tool.description {
                    function.insert(
                        "description".to_string(),
                        Value::String(description.clone()),
                    );
                }
                function.insert("parameters".to_string(), tool.parameters.clone());
                json!({
                    "type": "function",
                    "function": Value::Object(function),
                })
            })
            .collect()
    }

    /// Convert a choice's message into the domain's tagged form.
    /// `tool_calls: null` and `tool_calls: []` both mean a final answer.
    pub fn from_openai_message(message: OpenAIMessage) -> AssistantMessage {
        let calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall::new(call.id, call.function.name, call.function.arguments))
            .collect();
        AssistantMessage::from_parts(message.content, calls)
    }
}
