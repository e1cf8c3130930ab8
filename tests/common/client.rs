//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and speaks the JSON-RPC envelope of the /mcp endpoint.
//! When the wire format changes, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    next_id: AtomicI64,
}

#[allow(dead_code)]
impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            next_id: AtomicI64::new(1),
        }
    }

    // ========================================================================
    // Raw Endpoints
    // ========================================================================

    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    /// POSTs a raw body to /mcp
    pub async fn post_raw(&self, body: impl Into<reqwest::Body>) -> Response {
        self.client
            .post(format!("{}/mcp", self.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("MCP request failed")
    }

    /// POSTs an envelope and returns the decoded response envelope
    pub async fn send_envelope(&self, envelope: Value) -> Value {
        let response = self.post_raw(envelope.to_string()).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Response is not JSON")
    }

    // ========================================================================
    // JSON-RPC Methods
    // ========================================================================

    /// Sends `method` with a fresh numeric id and checks it is echoed back
    pub async fn request(&self, method: &str, params: Option<Value>) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut envelope = json!({"jsonrpc": "2.0", "id": id, "method": method});
        if let Some(params) = params {
            envelope["params"] = params;
        }

        let response = self.send_envelope(envelope).await;
        assert_eq!(response["id"], id, "Response id does not match request id");
        response
    }

    pub async fn tools_list(&self) -> Value {
        self.request("tools/list", None).await
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Value {
        self.request(
            "tools/call",
            Some(json!({"name": name, "arguments": arguments})),
        )
        .await
    }

    pub async fn resources_list(&self) -> Value {
        self.request("resources/list", None).await
    }

    pub async fn read_resource(&self, uri: &str) -> Value {
        self.request("resources/read", Some(json!({"uri": uri})))
            .await
    }

    // ========================================================================
    // Tool Helpers
    // ========================================================================

    /// Creates an item and returns its id
    pub async fn create_item(&self, name: &str, description: &str, category: &str) -> String {
        let response = self
            .call_tool(
                "create_item",
                json!({"name": name, "description": description, "category": category}),
            )
            .await;
        let text = tool_text(&response);
        text.rsplit(": ")
            .next()
            .expect("create_item reply carries no id")
            .to_string()
    }

    pub async fn list_items(&self, limit: Option<u64>) -> Vec<Value> {
        let arguments = match limit {
            Some(limit) => json!({"limit": limit}),
            None => json!({}),
        };
        let response = self.call_tool("list_items", arguments).await;
        serde_json::from_str(&tool_text(&response)).expect("list_items reply is not JSON")
    }
}

/// Text of the first content block of a successful tools/call response
pub fn tool_text(response: &Value) -> String {
    assert!(
        response.get("error").is_none(),
        "Unexpected error envelope: {}",
        response
    );
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("Missing text content")
        .to_string()
}

/// Whether a tools/call result is flagged as a tool error
pub fn is_tool_error(response: &Value) -> bool {
    response["result"]["isError"].as_bool().unwrap_or(false)
}

/// JSON-RPC error code of an error envelope
pub fn error_code(response: &Value) -> i64 {
    response["error"]["code"]
        .as_i64()
        .unwrap_or_else(|| panic!("Expected an error envelope, got {}", response))
}
