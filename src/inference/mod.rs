//! Inference service abstraction.
//!
//! The bridge only needs single-turn text generation and a model listing,
//! so the trait stays small. `BedrockProvider` is the production backend.

mod bedrock;
mod provider;
mod types;

pub use bedrock::{default_control_url, default_runtime_url, ApiKeySource, BedrockProvider};
pub use provider::{InferenceError, InferenceProvider, InvokeOptions};
pub use types::{ModelFamily, ModelSummary};
