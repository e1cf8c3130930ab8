use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::context::ToolContext;
use crate::inference::{InferenceError, InferenceProvider, InvokeOptions, ModelSummary};
use crate::items::SqliteItemStore;

pub type ScriptedReply = Result<String, InferenceError>;

/// Returns canned replies in order and records the prompts it was sent.
#[derive(Default)]
pub struct ScriptedInference {
    replies: Mutex<VecDeque<ScriptedReply>>,
    pub prompts: Mutex<Vec<(String, String, u32)>>,
}

impl ScriptedInference {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(vec![]),
        }
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
        self.prompts.lock().unwrap().push((
            model_id.to_string(),
            prompt.to_string(),
            options.max_tokens,
        ));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InferenceError::Connection("no scripted reply".to_string())))
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, InferenceError> {
        Ok(vec![ModelSummary {
            model_id: "amazon.titan-text-express-v1".to_string(),
            model_name: "Titan Text G1 - Express".to_string(),
            provider_name: "Amazon".to_string(),
            input_modalities: vec!["TEXT".to_string()],
            output_modalities: vec!["TEXT".to_string()],
        }])
    }

    async fn health_check(&self) -> Result<(), InferenceError> {
        Ok(())
    }
}

pub fn context_with(inference: Arc<ScriptedInference>) -> ToolContext {
    ToolContext {
        item_store: Arc::new(SqliteItemStore::in_memory("mcp-items").unwrap()),
        inference,
        default_model_id: "amazon.titan-text-express-v1".to_string(),
        inference_timeout: Duration::from_secs(5),
    }
}

pub fn test_context(replies: Vec<ScriptedReply>) -> ToolContext {
    context_with(Arc::new(ScriptedInference::new(replies)))
}
