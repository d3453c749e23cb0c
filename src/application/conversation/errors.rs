use crate::application::tooling::ToolInvokeError;
use crate::model::ModelError;
use thiserror::Error;

/// Everything that can fail a single turn. Caught at the turn boundary,
/// reported to the user, never fatal to the loop.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Transport(#[from] ModelError),
    #[error(transparent)]
    Tool(#[from] ToolInvokeError),
    #[error("tool '{tool}' received malformed arguments: {reason}")]
    MalformedArguments { tool: String, reason: String },
    #[error("model requested unknown tool '{0}'")]
    UnknownTool(String),
}

/// Failures of the conversation's own input/output streams; these end the loop.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("stdin/stdout I/O error: {0}")]
    Io(#[from] std::io::Error),
}
