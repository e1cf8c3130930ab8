use axum::extract::FromRef;

use crate::inference::InferenceProvider;
use crate::items::ItemStore;
use crate::mcp::ToolContext;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedItemStore = Arc<dyn ItemStore>;
pub type GuardedInferenceProvider = Arc<dyn InferenceProvider>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub item_store: GuardedItemStore,
    pub inference: GuardedInferenceProvider,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        item_store: GuardedItemStore,
        inference: GuardedInferenceProvider,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            item_store,
            inference,
            hash: env!("GIT_HASH").to_string(),
        }
    }
}

impl FromRef<ServerState> for ToolContext {
    fn from_ref(input: &ServerState) -> Self {
        ToolContext {
            item_store: input.item_store.clone(),
            inference: input.inference.clone(),
            default_model_id: input.config.default_model_id.clone(),
            inference_timeout: input.config.inference_timeout,
        }
    }
}
