//! Model infrastructure module
//!
//! Provides the chat-completion facade used by the conversation loop.
//!
//! # Structure
//! - `types` - Response and Error types
//! - `traits` - ChatClient trait
//! - `adapter` - OpenAI wire format conversion
//! - `clients` - Client implementations

pub mod adapter;
pub mod clients;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use clients::AzureOpenAIClient;
pub use traits::ChatClient;
pub use types::{ModelError, ModelResponse};
