//! MCP Tools
//!
//! The tool table is closed: every tool is a `Tool` variant with a fixed
//! parameter schema and a handler.

pub mod bedrock;
pub mod items;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::context::ToolContext;
use super::protocol::{McpError, ToolDefinition, ToolsCallResult};

/// Default `limit` of `list_items`, for the tool and for chat directives.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Result type for tool execution
pub type ToolResult = Result<ToolsCallResult, McpError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    CreateItem,
    ListItems,
    GetItem,
    UpdateItem,
    DeleteItem,
    BedrockChat,
    BedrockAnalyzeItems,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::CreateItem,
        Tool::ListItems,
        Tool::GetItem,
        Tool::UpdateItem,
        Tool::DeleteItem,
        Tool::BedrockChat,
        Tool::BedrockAnalyzeItems,
    ];

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tool::CreateItem => "create_item",
            Tool::ListItems => "list_items",
            Tool::GetItem => "get_item",
            Tool::UpdateItem => "update_item",
            Tool::DeleteItem => "delete_item",
            Tool::BedrockChat => "bedrock_chat",
            Tool::BedrockAnalyzeItems => "bedrock_analyze_items",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::CreateItem => "Create a new item in the items table",
            Tool::ListItems => "List items, most recently created first",
            Tool::GetItem => "Get a specific item by ID",
            Tool::UpdateItem => "Update fields of an existing item",
            Tool::DeleteItem => "Delete an item by ID",
            Tool::BedrockChat => {
                "Chat with a Bedrock model that can manage items on your behalf"
            }
            Tool::BedrockAnalyzeItems => "Analyze the stored items with a Bedrock model",
        }
    }

    pub fn input_schema(&self) -> Value {
        match self {
            Tool::CreateItem => json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Item name"},
                    "description": {"type": "string", "description": "Item description"},
                    "category": {"type": "string", "description": "Item category"},
                    "metadata": {"type": "object", "description": "Additional metadata"}
                },
                "required": ["name", "description", "category"]
            }),
            Tool::ListItems => json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of items to return (default 50)",
                        "minimum": 0
                    }
                }
            }),
            Tool::GetItem | Tool::DeleteItem => json!({
                "type": "object",
                "properties": {
                    "item_id": {"type": "string", "description": "Item ID"}
                },
                "required": ["item_id"]
            }),
            Tool::UpdateItem => json!({
                "type": "object",
                "properties": {
                    "item_id": {"type": "string", "description": "Item ID"},
                    "name": {"type": "string", "description": "New name"},
                    "description": {"type": "string", "description": "New description"},
                    "category": {"type": "string", "description": "New category"},
                    "metadata": {"type": "object", "description": "Replacement metadata"}
                },
                "required": ["item_id"]
            }),
            Tool::BedrockChat => json!({
                "type": "object",
                "properties": {
                    "message": {"type": "string", "description": "Message to send to the model"},
                    "model_id": {"type": "string", "description": "Bedrock model ID"}
                },
                "required": ["message"]
            }),
            Tool::BedrockAnalyzeItems => json!({
                "type": "object",
                "properties": {
                    "analysis_type": {
                        "type": "string",
                        "enum": ["summary", "categorization", "insights"],
                        "description": "Kind of analysis to perform"
                    },
                    "model_id": {"type": "string", "description": "Bedrock model ID"}
                },
                "required": ["analysis_type"]
            }),
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }

    pub fn definitions() -> Vec<ToolDefinition> {
        Tool::ALL.iter().map(Tool::definition).collect()
    }

    pub async fn call(self, ctx: &ToolContext, arguments: Value) -> ToolResult {
        debug!(tool = self.name(), "Executing tool");
        match self {
            Tool::CreateItem => items::create_item(ctx, arguments).await,
            Tool::ListItems => items::list_items(ctx, arguments).await,
            Tool::GetItem => items::get_item(ctx, arguments).await,
            Tool::UpdateItem => items::update_item(ctx, arguments).await,
            Tool::DeleteItem => items::delete_item(ctx, arguments).await,
            Tool::BedrockChat => bedrock::bedrock_chat(ctx, arguments).await,
            Tool::BedrockAnalyzeItems => bedrock::bedrock_analyze_items(ctx, arguments).await,
        }
    }
}

/// Deserializes tool arguments, rejecting wrong shapes before any side effect.
///
/// Only objects are accepted: derived structs would otherwise also fill
/// their fields by position from an array.
pub(crate) fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, McpError> {
    if !arguments.is_object() {
        return Err(McpError::InvalidParams(
            "arguments must be an object".to_string(),
        ));
    }
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidParams(e.to_string()))
}

pub(crate) fn to_json_result<T: serde::Serialize>(value: &T) -> ToolResult {
    ToolsCallResult::json(value).map_err(|e| McpError::InternalError(e.to_string()))
}
