//! Test doubles for the inference service

use async_trait::async_trait;
use mcp_bedrock_server::inference::{
    InferenceError, InferenceProvider, InvokeOptions, ModelSummary,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A prompt as received by the scripted provider
#[derive(Debug, Clone)]
pub struct RecordedPrompt {
    pub model_id: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Inference provider answering with queued replies
///
/// When the queue runs dry every call fails with a connection error, which
/// also makes unexpected inference calls visible in tests.
#[derive(Default)]
pub struct ScriptedInference {
    replies: Mutex<VecDeque<Result<String, InferenceError>>>,
    prompts: Mutex<Vec<RecordedPrompt>>,
    models_unavailable: bool,
}

impl ScriptedInference {
    pub fn new(replies: Vec<Result<String, InferenceError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    /// A provider whose model listing fails
    pub fn without_models() -> Self {
        Self {
            models_unavailable: true,
            ..Default::default()
        }
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn push_error(&self, error: InferenceError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceProvider for ScriptedInference {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(
        &self,
        model_id: &str,
        prompt: &str,
        options: &InvokeOptions,
    ) -> Result<String, InferenceError> {
        self.prompts.lock().unwrap().push(RecordedPrompt {
            model_id: model_id.to_string(),
            prompt: prompt.to_string(),
            max_tokens: options.max_tokens,
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InferenceError::Connection("no scripted reply".to_string())))
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, InferenceError> {
        if self.models_unavailable {
            return Err(InferenceError::Api {
                status: 403,
                message: "AccessDeniedException".to_string(),
            });
        }
        Ok(vec![
            ModelSummary {
                model_id: "amazon.titan-text-express-v1".to_string(),
                model_name: "Titan Text G1 - Express".to_string(),
                provider_name: "Amazon".to_string(),
                input_modalities: vec!["TEXT".to_string()],
                output_modalities: vec!["TEXT".to_string()],
            },
            ModelSummary {
                model_id: "anthropic.claude-3-haiku-20240307-v1:0".to_string(),
                model_name: "Claude 3 Haiku".to_string(),
                provider_name: "Anthropic".to_string(),
                input_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
                output_modalities: vec!["TEXT".to_string()],
            },
        ])
    }

    async fn health_check(&self) -> Result<(), InferenceError> {
        Ok(())
    }
}

/// A model reply wrapping `directive` in prose and a code fence
pub fn directive_reply(prose: &str, directive: Value) -> String {
    format!("{}\n```json\n{}\n```\nAnything else?", prose, directive)
}
