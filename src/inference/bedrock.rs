//! Amazon Bedrock inference provider.
//!
//! Uses the Bedrock HTTP APIs directly: `InvokeModel` on the runtime endpoint
//! and `ListFoundationModels` on the control-plane endpoint. Requests are
//! authenticated with a Bedrock API key sent as a bearer token.

use super::provider::{InferenceError, InferenceProvider, InvokeOptions};
use super::types::{ModelFamily, ModelSummary};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Timeout for api_key_command execution.
const API_KEY_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

const CONTROL_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of the bearer token used to authenticate.
#[derive(Clone)]
pub enum ApiKeySource {
    /// No authentication, e.g. behind a signing proxy.
    None,
    /// Static API key.
    Static(String),
    /// Shell command that outputs the API key (for rotating tokens).
    Command(String),
}

impl std::fmt::Debug for ApiKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiKeySource::None => write!(f, "None"),
            ApiKeySource::Static(_) => write!(f, "Static(<redacted>)"),
            ApiKeySource::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
        }
    }
}

impl ApiKeySource {
    /// Get the current API key, executing the command if necessary.
    async fn get_key(&self) -> Result<Option<String>, InferenceError> {
        match self {
            ApiKeySource::None => Ok(None),
            ApiKeySource::Static(key) => Ok(Some(key.clone())),
            ApiKeySource::Command(cmd) => {
                debug!(command = %cmd, "Fetching Bedrock API key via command");

                let result = tokio::time::timeout(
                    API_KEY_COMMAND_TIMEOUT,
                    Command::new("sh").arg("-c").arg(cmd).output(),
                )
                .await;

                let output = match result {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => {
                        warn!(command = %cmd, error = %e, "api_key_command failed to execute");
                        return Err(InferenceError::Credentials(format!(
                            "Failed to execute api_key_command: {}",
                            e
                        )));
                    }
                    Err(_) => {
                        warn!(command = %cmd, "api_key_command timed out");
                        return Err(InferenceError::Credentials(
                            "api_key_command timed out".to_string(),
                        ));
                    }
                };

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(command = %cmd, stderr = %stderr, "api_key_command failed");
                    return Err(InferenceError::Credentials(format!(
                        "api_key_command failed with status {}: {}",
                        output.status, stderr
                    )));
                }

                let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if key.is_empty() {
                    return Err(InferenceError::Credentials(
                        "api_key_command returned empty key".to_string(),
                    ));
                }

                Ok(Some(key))
            }
        }
    }
}

/// Bedrock provider talking to the runtime and control-plane HTTP endpoints.
pub struct BedrockProvider {
    client: Client,
    runtime_url: String,
    control_url: String,
    api_key_source: ApiKeySource,
}

impl BedrockProvider {
    /// # Arguments
    /// * `runtime_url` - Base URL of the runtime API (e.g. "https://bedrock-runtime.us-east-1.amazonaws.com").
    /// * `control_url` - Base URL of the control-plane API (e.g. "https://bedrock.us-east-1.amazonaws.com").
    /// * `api_key_source` - Where the bearer token comes from.
    pub fn new(
        runtime_url: impl Into<String>,
        control_url: impl Into<String>,
        api_key_source: ApiKeySource,
    ) -> Self {
        Self {
            client: Client::new(),
            runtime_url: runtime_url.into().trim_end_matches('/').to_string(),
            control_url: control_url.into().trim_end_matches('/').to_string(),
            api_key_source,
        }
    }

    /// Provider using the public endpoints of `region`.
    pub fn for_region(region: &str, api_key_source: ApiKeySource) -> Self {
        Self::new(
            default_runtime_url(region),
            default_control_url(region),
            api_key_source,
        )
    }

    pub fn runtime_url(&self) -> &str {
        &self.runtime_url
    }

    pub fn control_url(&self) -> &str {
        &self.control_url
    }

    async fn authorize(&self, req_builder: RequestBuilder) -> Result<RequestBuilder, InferenceError> {
        Ok(match self.api_key_source.get_key().await? {
            Some(api_key) => req_builder.bearer_auth(api_key),
            None => req_builder,
        })
    }

    async fn send(req_builder: RequestBuilder) -> Result<Response, InferenceError> {
        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout
            } else {
                InferenceError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(InferenceError::Throttled);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }
}

pub fn default_runtime_url(region: &str) -> String {
    format!("https://bedrock-runtime.{}.amazonaws.com", region)
}

pub fn default_control_url(region: &str) -> String {
    format!("https://bedrock.{}.amazonaws.com", region)
}

#[async_trait]
impl InferenceProvider for BedrockProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn invoke(
        &self,
        model_id: &str,
        prompt: &str,
        options: &InvokeOptions,
    ) -> Result<String, InferenceError> {
        let family = ModelFamily::from_model_id(model_id);
        let url = format!(
            "{}/model/{}/invoke",
            self.runtime_url,
            urlencoding::encode(model_id)
        );

        debug!(
            model_id = %model_id,
            family = ?family,
            prompt_len = prompt.len(),
            "Sending InvokeModel request to Bedrock"
        );

        let req_builder = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&family.request_body(prompt, options))
            .timeout(options.timeout);
        let response = Self::send(self.authorize(req_builder).await?).await?;

        let body: serde_json::Value = response.json().await.map_err(|e| {
            InferenceError::InvalidResponse(format!("Failed to parse Bedrock response: {}", e))
        })?;

        let text = family.extract_text(body)?;
        debug!(model_id = %model_id, reply_len = text.len(), "Received Bedrock completion");
        Ok(text)
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, InferenceError> {
        let url = format!("{}/foundation-models", self.control_url);

        let req_builder = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .timeout(CONTROL_REQUEST_TIMEOUT);
        let response = Self::send(self.authorize(req_builder).await?).await?;

        let listing: ListFoundationModelsResponse = response.json().await.map_err(|e| {
            InferenceError::InvalidResponse(format!("Failed to parse model listing: {}", e))
        })?;
        Ok(listing.model_summaries)
    }

    async fn health_check(&self) -> Result<(), InferenceError> {
        self.list_models().await.map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFoundationModelsResponse {
    #[serde(default)]
    model_summaries: Vec<ModelSummary>,
}
