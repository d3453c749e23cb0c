//! # Infrastructure Module
//!
//! Outbound integrations. [`model`] talks to the hosted chat-completion API.

pub mod model;
