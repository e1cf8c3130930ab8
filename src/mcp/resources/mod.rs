//! MCP Resources
//!
//! Read-only views over the items table and the model catalog.

use tracing::warn;

use super::context::ToolContext;
use super::protocol::{McpError, ResourceContent, ResourceDefinition};

/// Result type for resource reads
pub type ResourceResult = Result<Vec<ResourceContent>, McpError>;

const JSON_MIME_TYPE: &str = "application/json";

/// Items included in `items://all`.
const ALL_ITEMS_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    AllItems,
    BedrockModels,
}

impl Resource {
    pub const ALL: [Resource; 2] = [Resource::AllItems, Resource::BedrockModels];

    pub fn from_uri(uri: &str) -> Option<Resource> {
        Resource::ALL.into_iter().find(|resource| resource.uri() == uri)
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Resource::AllItems => "items://all",
            Resource::BedrockModels => "bedrock://models",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Resource::AllItems => "All Items",
            Resource::BedrockModels => "Bedrock Models",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Resource::AllItems => "The most recent items in the items table",
            Resource::BedrockModels => "Foundation models available through Bedrock",
        }
    }

    pub fn definition(&self) -> ResourceDefinition {
        ResourceDefinition {
            uri: self.uri().to_string(),
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            mime_type: Some(JSON_MIME_TYPE.to_string()),
        }
    }

    pub fn definitions() -> Vec<ResourceDefinition> {
        Resource::ALL.iter().map(Resource::definition).collect()
    }

    pub async fn read(self, ctx: &ToolContext) -> ResourceResult {
        let text = match self {
            Resource::AllItems => {
                let items = ctx
                    .item_store
                    .list_items(ALL_ITEMS_LIMIT)
                    .map_err(McpError::upstream)?;
                serde_json::to_string_pretty(&items)
            }
            Resource::BedrockModels => {
                let models = ctx.inference.list_models().await.map_err(|e| {
                    warn!(error = %e, "Failed to list Bedrock models");
                    McpError::Upstream(e.to_string())
                })?;
                serde_json::to_string_pretty(&models)
            }
        }
        .map_err(|e| McpError::InternalError(e.to_string()))?;

        Ok(vec![ResourceContent {
            uri: self.uri().to_string(),
            mime_type: Some(JSON_MIME_TYPE.to_string()),
            text,
        }])
    }
}
