//! Chat directives.
//!
//! A model reply may embed an action such as
//! `{"action": "create_item", "params": {"name": "Lamp"}}` somewhere in its
//! prose. Extraction is tolerant: anything that does not yield a well-formed
//! object with a string `action` simply means there is no directive.
//! Validation is strict: the action must be one of the item operations and the
//! params must have the right types, otherwise nothing is executed.

use std::ops::Range;

use serde::Deserialize;
use serde_json::{Deserializer, Map, Value};
use thiserror::Error;

use crate::items::{ItemMetadata, ItemUpdate, NewItem};
use crate::mcp::tools::DEFAULT_LIST_LIMIT;

pub const DEFAULT_ITEM_NAME: &str = "AI Generated Item";
pub const DEFAULT_ITEM_DESCRIPTION: &str = "Item created by AI agent";
pub const DEFAULT_ITEM_CATEGORY: &str = "ai-created";
pub const CREATED_BY_KEY: &str = "created_by";
pub const CREATED_BY_AGENT: &str = "ai_agent";

/// A directive as found in the reply, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub action: String,
    pub params: Value,
}

/// A directive together with the byte range it occupied in the reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDirective {
    pub directive: Directive,
    pub span: Range<usize>,
}

/// A validated item operation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    CreateItem(NewItem),
    UpdateItem { item_id: String, update: ItemUpdate },
    DeleteItem { item_id: String },
    GetItem { item_id: String },
    ListItems { limit: usize },
}

impl ChatAction {
    pub fn name(&self) -> &'static str {
        match self {
            ChatAction::CreateItem(_) => "create_item",
            ChatAction::UpdateItem { .. } => "update_item",
            ChatAction::DeleteItem { .. } => "delete_item",
            ChatAction::GetItem { .. } => "get_item",
            ChatAction::ListItems { .. } => "list_items",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DirectiveError {
    #[error("unsupported action '{0}'")]
    UnsupportedAction(String),

    #[error("params of '{action}' must be an object")]
    ParamsNotObject { action: String },

    #[error("invalid params for '{action}': {reason}")]
    InvalidParams { action: String, reason: String },

    #[error("'{0}' requires an item_id")]
    MissingItemId(String),
}

/// Finds the first JSON object in `reply` that carries a string `action`.
///
/// Every `{` is tried as the start of a JSON value; the first complete object
/// with an `action` string wins. Objects nested inside a rejected candidate
/// are still considered.
pub fn extract_directive(reply: &str) -> Option<ExtractedDirective> {
    for (start, _) in reply.match_indices('{') {
        let mut stream = Deserializer::from_str(&reply[start..]).into_iter::<Value>();
        let Some(Ok(Value::Object(mut object))) = stream.next() else {
            continue;
        };
        let end = start + stream.byte_offset();

        let action = match object.remove("action") {
            Some(Value::String(action)) => action,
            _ => continue,
        };
        let params = object
            .remove("params")
            .filter(|params| !params.is_null())
            .unwrap_or_else(|| Value::Object(Map::new()));

        return Some(ExtractedDirective {
            directive: Directive { action, params },
            span: start..end,
        });
    }
    None
}

/// Removes the directive from `reply`, along with a code fence left empty by
/// the removal.
pub fn strip_directive(reply: &str, span: Range<usize>) -> String {
    let mut before = reply[..span.start].trim_end();
    let mut after = reply[span.end..].trim_start();

    if after.starts_with("```") {
        if let Some(line_start) = opening_fence_line(before) {
            before = before[..line_start].trim_end();
            after = after[3..].trim_start();
        }
    }

    match (before.is_empty(), after.is_empty()) {
        (true, true) => String::new(),
        (false, true) => before.to_string(),
        (true, false) => after.to_string(),
        (false, false) => format!("{}\n\n{}", before, after),
    }
}

/// Start of the last line of `text` when that line opens a code fence.
///
/// Fences alternate between opening and closing, so the line only opens one
/// when an odd number of fence lines precede it (itself included).
fn opening_fence_line(text: &str) -> Option<usize> {
    let line_start = text.rfind('\n').map_or(0, |i| i + 1);
    let tag = text[line_start..].trim_start().strip_prefix("```")?;
    if !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let fence_lines = text
        .lines()
        .filter(|line| line.trim_start().starts_with("```"))
        .count();
    (fence_lines % 2 == 1).then_some(line_start)
}

#[derive(Debug, Deserialize)]
struct CreateParams {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    metadata: Option<ItemMetadata>,
}

#[derive(Debug, Deserialize)]
struct UpdateParams {
    #[serde(default)]
    item_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    metadata: Option<ItemMetadata>,
}

#[derive(Debug, Deserialize)]
struct IdParams {
    #[serde(default)]
    item_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default)]
    limit: Option<usize>,
}

impl Directive {
    /// Checks the action against the item operations and types its params.
    pub fn validate(&self) -> Result<ChatAction, DirectiveError> {
        if !self.params.is_object() {
            return Err(DirectiveError::ParamsNotObject {
                action: self.action.clone(),
            });
        }

        match self.action.as_str() {
            "create_item" => {
                let params: CreateParams = self.parse_params()?;
                let mut metadata = params.metadata.unwrap_or_default();
                metadata.insert(
                    CREATED_BY_KEY.to_string(),
                    Value::String(CREATED_BY_AGENT.to_string()),
                );
                Ok(ChatAction::CreateItem(NewItem {
                    name: params.name.unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string()),
                    description: params
                        .description
                        .unwrap_or_else(|| DEFAULT_ITEM_DESCRIPTION.to_string()),
                    category: params
                        .category
                        .unwrap_or_else(|| DEFAULT_ITEM_CATEGORY.to_string()),
                    metadata,
                }))
            }
            "update_item" => {
                let params: UpdateParams = self.parse_params()?;
                let item_id = self.require_id(params.item_id, params.id)?;
                Ok(ChatAction::UpdateItem {
                    item_id,
                    update: ItemUpdate {
                        name: params.name,
                        description: params.description,
                        category: params.category,
                        metadata: params.metadata,
                    },
                })
            }
            "delete_item" => {
                let params: IdParams = self.parse_params()?;
                let item_id = self.require_id(params.item_id, params.id)?;
                Ok(ChatAction::DeleteItem { item_id })
            }
            "get_item" => {
                let params: IdParams = self.parse_params()?;
                let item_id = self.require_id(params.item_id, params.id)?;
                Ok(ChatAction::GetItem { item_id })
            }
            "list_items" => {
                let params: ListParams = self.parse_params()?;
                Ok(ChatAction::ListItems {
                    limit: params.limit.unwrap_or(DEFAULT_LIST_LIMIT),
                })
            }
            other => Err(DirectiveError::UnsupportedAction(other.to_string())),
        }
    }

    fn parse_params<T: for<'de> Deserialize<'de>>(&self) -> Result<T, DirectiveError> {
        T::deserialize(&self.params).map_err(|e| DirectiveError::InvalidParams {
            action: self.action.clone(),
            reason: e.to_string(),
        })
    }

    fn require_id(
        &self,
        item_id: Option<String>,
        id: Option<String>,
    ) -> Result<String, DirectiveError> {
        item_id
            .or(id)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| DirectiveError::MissingItemId(self.action.clone()))
    }
}
