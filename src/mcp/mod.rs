//! MCP (Model Context Protocol) bridge
//!
//! Exposes the item tools, the Bedrock tools and two read-only resources over
//! JSON-RPC 2.0.
//!
//! ## Architecture
//!
//! - Transport: HTTP POST at `/mcp`, one envelope per request
//! - Methods: `tools/list`, `tools/call`, `resources/list`, `resources/read`
//! - Tools and resources: closed enums, no runtime registration

pub mod context;
pub mod directive;
pub mod handler;
pub mod protocol;
pub mod resources;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::ToolContext;
pub use handler::{handle_message, mcp_handler};
pub use protocol::{McpError, McpRequest, McpResponse};
