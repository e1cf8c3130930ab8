//! Bedrock Tools
//!
//! `bedrock_chat` lets the model manage items through directives embedded in
//! its reply; `bedrock_analyze_items` asks the model to analyze the table.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{parse_arguments, ToolResult};
use crate::items::{format_timestamp, Item};
use crate::mcp::context::ToolContext;
use crate::mcp::directive::{extract_directive, strip_directive, ChatAction};
use crate::mcp::protocol::{McpError, ToolsCallResult};

const CHAT_MAX_TOKENS: u32 = 1000;
const ANALYSIS_MAX_TOKENS: u32 = 2000;

/// Items sent to the model for analysis.
const ANALYSIS_ITEM_LIMIT: usize = 100;

/// Items spelled out in a chat listing; the rest are only counted.
const CHAT_LISTING_LIMIT: usize = 10;

const CHAT_SYSTEM_PROMPT: &str = r#"You are an assistant that manages a table of items by emitting action directives.

When the user asks to create, update, delete, get or list items, answer with a short sentence and then put exactly one JSON directive on its own line, in this form:

{"action": "create_item", "params": {"name": "...", "description": "...", "category": "..."}}

Available actions and params:
- create_item: name, description, category, optional metadata object
- update_item: item_id plus any of name, description, category, metadata
- delete_item: item_id
- get_item: item_id
- list_items: optional limit

Examples:
User: add a desk lamp to the office category
Assistant: Adding the desk lamp now.
{"action": "create_item", "params": {"name": "Desk lamp", "description": "Lamp for the desk", "category": "office"}}

User: remove item 3f2a9c
Assistant: Deleting that item.
{"action": "delete_item", "params": {"item_id": "3f2a9c"}}

Use the values the user gives you and sensible defaults for the rest. If the user is only chatting, answer normally without a directive.

User message: "#;

// ============================================================================
// bedrock_chat
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatParams {
    message: String,
    #[serde(default)]
    model_id: Option<String>,
}

pub async fn bedrock_chat(ctx: &ToolContext, arguments: Value) -> ToolResult {
    let params: ChatParams = parse_arguments(arguments)?;
    let model_id = ctx.model_id(params.model_id.as_deref());
    let prompt = format!("{}{}", CHAT_SYSTEM_PROMPT, params.message);

    let reply = match ctx
        .inference
        .invoke(model_id, &prompt, &ctx.invoke_options(CHAT_MAX_TOKENS))
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            warn!(model_id = %model_id, error = %e, "Bedrock chat request failed");
            return Ok(ToolsCallResult::error(format!(
                "Error communicating with Bedrock: {}",
                e
            )));
        }
    };

    let Some(extracted) = extract_directive(&reply) else {
        return Ok(ToolsCallResult::text(reply));
    };
    let cleaned = strip_directive(&reply, extracted.span.clone());

    let outcome = match extracted.directive.validate() {
        Ok(action) => {
            info!(action = action.name(), "Executing chat directive");
            execute_action(ctx, action)
        }
        Err(e) => {
            debug!(error = %e, "Ignoring invalid chat directive");
            format!(
                "⚠️ The suggested action could not be executed ({}). No action taken.",
                e
            )
        }
    };

    Ok(ToolsCallResult::text(join_reply(&cleaned, &outcome)))
}

fn join_reply(cleaned: &str, outcome: &str) -> String {
    if cleaned.is_empty() {
        outcome.to_string()
    } else {
        format!("{}\n\n{}", cleaned, outcome)
    }
}

/// Runs a validated directive and describes the outcome. Store failures are
/// reported in the text so the conversation can go on.
fn execute_action(ctx: &ToolContext, action: ChatAction) -> String {
    let name = action.name();
    let store = &ctx.item_store;

    let outcome = match action {
        ChatAction::CreateItem(new_item) => store.create_item(new_item).map(|item| {
            format!(
                "✅ Successfully executed! Created item:\n{}",
                describe_item(&item)
            )
        }),
        ChatAction::UpdateItem { item_id, update } => {
            store.update_item(&item_id, update).map(|updated| match updated {
                Some(item) => format!(
                    "✅ Successfully executed! Updated item:\n{}",
                    describe_item(&item)
                ),
                None => missing_item(&item_id),
            })
        }
        ChatAction::DeleteItem { item_id } => store.get_item(&item_id).and_then(|existing| {
            let Some(item) = existing else {
                return Ok(missing_item(&item_id));
            };
            Ok(if store.delete_item(&item_id)? {
                format!(
                    "✅ Successfully executed! Deleted item:\n- ID: {}\n- Name: {}\n- Category: {}",
                    item.id, item.name, item.category
                )
            } else {
                missing_item(&item_id)
            })
        }),
        ChatAction::GetItem { item_id } => store.get_item(&item_id).map(|found| match found {
            Some(item) => format!(
                "✅ Successfully executed! Found item:\n{}\n- Created: {}",
                describe_item(&item),
                format_timestamp(&item.created_at)
            ),
            None => missing_item(&item_id),
        }),
        ChatAction::ListItems { limit } => store.list_items(limit).map(|items| describe_listing(&items)),
    };

    outcome.unwrap_or_else(|e| {
        warn!(action = name, error = %e, "Chat directive failed");
        format!("❌ Error executing {}: {:#}", name, e)
    })
}

fn describe_item(item: &Item) -> String {
    format!(
        "- ID: {}\n- Name: {}\n- Category: {}\n- Description: {}",
        item.id, item.name, item.category, item.description
    )
}

fn missing_item(item_id: &str) -> String {
    format!(
        "❌ Error: Item with ID '{}' not found. No action taken.\n\nTo see the available items and their IDs, ask me to list all items first.",
        item_id
    )
}

fn describe_listing(items: &[Item]) -> String {
    let mut text = format!("✅ Successfully executed! Found {} items:", items.len());
    for item in items.iter().take(CHAT_LISTING_LIMIT) {
        text.push_str(&format!(
            "\n- {} (ID: {}, Category: {})",
            item.name, item.id, item.category
        ));
    }
    if items.len() > CHAT_LISTING_LIMIT {
        text.push_str(&format!(
            "\n... and {} more items",
            items.len() - CHAT_LISTING_LIMIT
        ));
    }
    text
}

// ============================================================================
// bedrock_analyze_items
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AnalysisType {
    Summary,
    Categorization,
    Insights,
}

impl AnalysisType {
    fn instruction(&self) -> &'static str {
        match self {
            AnalysisType::Summary => "Please provide a summary of these items:",
            AnalysisType::Categorization => "Please analyze and categorize these items:",
            AnalysisType::Insights => "Please provide insights and patterns from these items:",
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    analysis_type: AnalysisType,
    #[serde(default)]
    model_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ItemDigest<'a> {
    id: &'a str,
    name: &'a str,
    category: &'a str,
    description: &'a str,
    created_at: String,
}

impl<'a> From<&'a Item> for ItemDigest<'a> {
    fn from(item: &'a Item) -> Self {
        ItemDigest {
            id: &item.id,
            name: &item.name,
            category: &item.category,
            description: &item.description,
            created_at: format_timestamp(&item.created_at),
        }
    }
}

pub async fn bedrock_analyze_items(ctx: &ToolContext, arguments: Value) -> ToolResult {
    let params: AnalyzeParams = parse_arguments(arguments)?;
    let model_id = ctx.model_id(params.model_id.as_deref());

    let items = ctx
        .item_store
        .list_items(ANALYSIS_ITEM_LIMIT)
        .map_err(McpError::upstream)?;
    if items.is_empty() {
        return Ok(ToolsCallResult::text("No items found to analyze."));
    }

    let digest: Vec<ItemDigest> = items.iter().map(ItemDigest::from).collect();
    let digest_text = serde_json::to_string_pretty(&digest)
        .map_err(|e| McpError::InternalError(e.to_string()))?;
    let prompt = format!("{}\n{}", params.analysis_type.instruction(), digest_text);

    match ctx
        .inference
        .invoke(model_id, &prompt, &ctx.invoke_options(ANALYSIS_MAX_TOKENS))
        .await
    {
        Ok(analysis) => Ok(ToolsCallResult::text(analysis)),
        Err(e) => {
            warn!(model_id = %model_id, error = %e, "Bedrock analysis request failed");
            Ok(ToolsCallResult::error(format!(
                "Error analyzing items with Bedrock: {}",
                e
            )))
        }
    }
}
