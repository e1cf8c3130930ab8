//! Item Tools
//!
//! CRUD operations over the items table.

use serde::Deserialize;
use serde_json::Value;

use super::{parse_arguments, to_json_result, ToolResult, DEFAULT_LIST_LIMIT};
use crate::items::{ItemMetadata, ItemUpdate, NewItem};
use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};

pub fn not_found_message(item_id: &str) -> String {
    format!("Item with ID {} not found", item_id)
}

// ============================================================================
// create_item
// ============================================================================

pub async fn create_item(ctx: &ToolContext, arguments: Value) -> ToolResult {
    let new_item: NewItem = parse_arguments(arguments)?;

    let item = ctx
        .item_store
        .create_item(new_item)
        .map_err(McpError::upstream)?;

    Ok(ToolsCallResult::text(format!(
        "Successfully created item with ID: {}",
        item.id
    )))
}

// ============================================================================
// list_items
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListItemsParams {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

pub async fn list_items(ctx: &ToolContext, arguments: Value) -> ToolResult {
    let params: ListItemsParams = parse_arguments(arguments)?;

    let items = ctx
        .item_store
        .list_items(params.limit)
        .map_err(McpError::upstream)?;

    to_json_result(&items)
}

// ============================================================================
// get_item / delete_item
// ============================================================================

#[derive(Debug, Deserialize)]
struct ItemIdParams {
    item_id: String,
}

pub async fn get_item(ctx: &ToolContext, arguments: Value) -> ToolResult {
    let params: ItemIdParams = parse_arguments(arguments)?;

    match ctx
        .item_store
        .get_item(&params.item_id)
        .map_err(McpError::upstream)?
    {
        Some(item) => to_json_result(&item),
        None => Ok(ToolsCallResult::error(not_found_message(&params.item_id))),
    }
}

pub async fn delete_item(ctx: &ToolContext, arguments: Value) -> ToolResult {
    let params: ItemIdParams = parse_arguments(arguments)?;

    let deleted = ctx
        .item_store
        .delete_item(&params.item_id)
        .map_err(McpError::upstream)?;

    if deleted {
        Ok(ToolsCallResult::text(format!(
            "Successfully deleted item {}",
            params.item_id
        )))
    } else {
        Ok(ToolsCallResult::error(not_found_message(&params.item_id)))
    }
}

// ============================================================================
// update_item
// ============================================================================

#[derive(Debug, Deserialize)]
struct UpdateItemParams {
    item_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    metadata: Option<ItemMetadata>,
}

pub async fn update_item(ctx: &ToolContext, arguments: Value) -> ToolResult {
    let params: UpdateItemParams = parse_arguments(arguments)?;
    let update = ItemUpdate {
        name: params.name,
        description: params.description,
        category: params.category,
        metadata: params.metadata,
    };

    match ctx
        .item_store
        .update_item(&params.item_id, update)
        .map_err(McpError::upstream)?
    {
        Some(item) => to_json_result(&item),
        None => Ok(ToolsCallResult::error(not_found_message(&params.item_id))),
    }
}
