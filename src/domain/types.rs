use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

/// A request from the model to invoke one tool.
///
/// `arguments` is kept as the raw JSON text the model produced; it is only
/// parsed right before dispatch so a malformed payload fails the turn rather
/// than the response decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// What the assistant said in one response: either a final answer or a
/// request to run tools. Never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantMessage {
    Text(String),
    ToolCalls {
        /// Optional preamble some deployments send alongside tool calls.
        content: Option<String>,
        calls: Vec<ToolCall>,
    },
}

impl AssistantMessage {
    /// Builds the message from the loosely shaped wire fields. An empty call
    /// list collapses into a text answer.
    pub fn from_parts(content: Option<String>, calls: Vec<ToolCall>) -> Self {
        if calls.is_empty() {
            AssistantMessage::Text(content.unwrap_or_default())
        } else {
            AssistantMessage::ToolCalls { content, calls }
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            AssistantMessage::Text(text) => Some(text),
            AssistantMessage::ToolCalls { content, .. } => content.as_deref(),
        }
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            AssistantMessage::Text(_) => &[],
            AssistantMessage::ToolCalls { calls, .. } => calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    System { content: String },
    User { content: String },
    Assistant(AssistantMessage),
    Tool { tool_call_id: String, content: String },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
        }
    }

    pub fn assistant(message: AssistantMessage) -> Self {
        ChatMessage::Assistant(message)
    }

    pub fn tool_result(result: ToolResult) -> Self {
        ChatMessage::Tool {
            tool_call_id: result.call_id,
            content: result.content,
        }
    }

    pub fn role(&self) -> MessageRole {
        match self {
            ChatMessage::System { .. } => MessageRole::System,
            ChatMessage::User { .. } => MessageRole::User,
            ChatMessage::Assistant(_) => MessageRole::Assistant,
            ChatMessage::Tool { .. } => MessageRole::Tool,
        }
    }
}

/// Tool descriptor as advertised by the MCP server in `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema,
        }
    }
}

/// Tool definition in the shape the completion request expects.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Value,
}

impl ToolSpec {
    pub fn empty_parameters() -> Value {
        json!({ "type": "object", "properties": {} })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub call_id: String,
    pub content: String,
}
