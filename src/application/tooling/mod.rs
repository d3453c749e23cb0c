//! Tool discovery and invocation over an MCP session.

mod error;
mod interface;
mod process;
mod registry;

pub use error::ToolInvokeError;
pub use interface::{CallToolResult, ToolSession};
pub use process::StdioSession;
pub use registry::ToolRegistry;
