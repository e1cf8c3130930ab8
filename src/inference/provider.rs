//! Inference provider trait definition.

use super::types::ModelSummary;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Options for a single generation request.
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 1000,
            timeout: Duration::from_secs(120),
        }
    }
}

impl InvokeOptions {
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors that can occur when talking to the inference service.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Throttled by inference service")]
    Throttled,

    #[error("Request timeout")]
    Timeout,

    #[error("Credentials error: {0}")]
    Credentials(String),
}

/// A text-generation backend.
///
/// The bridge issues one outbound call per tool invocation; retries and
/// backoff are left to the service.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Provider name, e.g. "bedrock".
    fn name(&self) -> &str;

    /// Generates a completion for a single-turn `prompt` with `model_id`.
    async fn invoke(
        &self,
        model_id: &str,
        prompt: &str,
        options: &InvokeOptions,
    ) -> Result<String, InferenceError>;

    /// Lists the foundation models the service exposes.
    async fn list_models(&self) -> Result<Vec<ModelSummary>, InferenceError>;

    /// Check if the provider is reachable.
    async fn health_check(&self) -> Result<(), InferenceError>;
}
