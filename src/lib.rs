//! MCP Bedrock Server Library
//!
//! JSON-RPC bridge exposing item CRUD tools and Bedrock-backed chat and
//! analysis tools. The modules are public for the end-to-end tests.

pub mod config;
pub mod inference;
pub mod items;
pub mod mcp;
pub mod server;

// Re-export commonly used types for convenience
pub use inference::{BedrockProvider, InferenceProvider};
pub use items::{ItemStore, SqliteItemStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
