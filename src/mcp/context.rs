//! MCP Tool Execution Context
//!
//! Provides access to server state for tool and resource implementations.

use std::sync::Arc;
use std::time::Duration;

use crate::inference::{InferenceProvider, InvokeOptions};
use crate::items::ItemStore;

/// Context provided to tool and resource handlers during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Access to the items table
    pub item_store: Arc<dyn ItemStore>,

    /// Text generation backend
    pub inference: Arc<dyn InferenceProvider>,

    /// Model used when a tool call does not name one
    pub default_model_id: String,

    /// Upper bound for a single inference request
    pub inference_timeout: Duration,
}

impl ToolContext {
    /// Generation options capped at `max_tokens`.
    pub fn invoke_options(&self, max_tokens: u32) -> InvokeOptions {
        InvokeOptions::default()
            .with_max_tokens(max_tokens)
            .with_timeout(self.inference_timeout)
    }

    /// `requested` if given, the configured default otherwise.
    pub fn model_id<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.default_model_id)
    }
}
