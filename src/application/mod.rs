//! # Application Module
//!
//! ## Submodules
//!
//! - [`conversation`] - The interactive read-complete-dispatch loop
//! - [`tooling`] - MCP stdio session and the tool catalogue it exposes

pub mod conversation;
pub mod tooling;
