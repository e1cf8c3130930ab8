//! Request and response shapes of the Bedrock model families.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::provider::{InferenceError, InvokeOptions};

/// Bedrock API version string required by Anthropic models.
pub const ANTHROPIC_BEDROCK_VERSION: &str = "bedrock-2023-05-31";

/// Model families differ in request body and reply layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Anthropic,
    /// Amazon Titan text models, also used as the fallback for unknown ids.
    Titan,
}

impl ModelFamily {
    /// Anthropic ids start with `anthropic.`, cross-region inference profiles
    /// prefix a geography (e.g. `us.anthropic.`).
    pub fn from_model_id(model_id: &str) -> Self {
        if model_id.starts_with("anthropic.") || model_id.contains(".anthropic.") {
            ModelFamily::Anthropic
        } else {
            ModelFamily::Titan
        }
    }

    pub fn request_body(&self, prompt: &str, options: &InvokeOptions) -> Value {
        match self {
            ModelFamily::Anthropic => json!({
                "anthropic_version": ANTHROPIC_BEDROCK_VERSION,
                "max_tokens": options.max_tokens,
                "temperature": options.temperature,
                "top_p": options.top_p,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt
                    }
                ]
            }),
            ModelFamily::Titan => json!({
                "inputText": prompt,
                "textGenerationConfig": {
                    "maxTokenCount": options.max_tokens,
                    "stopSequences": [],
                    "temperature": options.temperature,
                    "topP": options.top_p
                }
            }),
        }
    }

    /// Pulls the generated text out of a reply body.
    pub fn extract_text(&self, body: Value) -> Result<String, InferenceError> {
        match self {
            ModelFamily::Anthropic => {
                let reply: AnthropicReply = serde_json::from_value(body).map_err(|e| {
                    InferenceError::InvalidResponse(format!("Failed to parse Anthropic reply: {}", e))
                })?;
                let text: Vec<String> = reply
                    .content
                    .into_iter()
                    .filter(|block| block.block_type == "text")
                    .filter_map(|block| block.text)
                    .collect();
                if text.is_empty() {
                    return Err(InferenceError::InvalidResponse(
                        "No text content in Anthropic reply".to_string(),
                    ));
                }
                Ok(text.join(""))
            }
            ModelFamily::Titan => {
                let reply: TitanReply = serde_json::from_value(body).map_err(|e| {
                    InferenceError::InvalidResponse(format!("Failed to parse Titan reply: {}", e))
                })?;
                reply
                    .results
                    .into_iter()
                    .next()
                    .map(|r| r.output_text)
                    .ok_or_else(|| {
                        InferenceError::InvalidResponse("No results in Titan reply".to_string())
                    })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicReply {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitanReply {
    results: Vec<TitanResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitanResult {
    output_text: String,
}

/// A foundation model as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub model_id: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub provider_name: String,
    #[serde(default)]
    pub input_modalities: Vec<String>,
    #[serde(default)]
    pub output_modalities: Vec<String>,
}
