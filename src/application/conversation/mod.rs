//! # Conversation Module
//!
//! The tool-augmented chat loop. Each turn:
//!
//! 1. read one line of user input (end of input or Ctrl-C stops the loop)
//! 2. send the full history plus the tool specs to the [`ChatClient`]
//! 3. if the assistant asked for tools, run each call in order through the
//!    [`ToolSession`], append the results and ask again
//! 4. print the final answer
//!
//! Steps 2-4 sit behind a single error boundary: any [`TurnError`] is printed
//! as `An error occurred: <message>`, the turn's messages are dropped from the
//! history, and the loop waits for the next line.
//!
//! [`ChatClient`]: crate::model::ChatClient
//! [`ToolSession`]: crate::tooling::ToolSession

mod errors;
mod runner;
mod state;

pub use errors::{ConversationError, TurnError};
pub use runner::{Conversation, ConversationOptions, ERROR_PREFIX};
pub use state::{ConversationState, TurnPhase};

#[cfg(test)]
mod tests;
