//! End-to-end tests for the JSON-RPC envelope, resources and health
//!
//! Every /mcp answer is HTTP 200 with a JSON-RPC body, errors included.

mod common;

use common::{
    error_code, tool_text, ScriptedInference, TestClient, TestServer, INVALID_PARAMS,
    INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, RESOURCE_NOT_FOUND, UPSTREAM_FAILURE,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Envelope
// ============================================================================

#[tokio::test]
async fn test_malformed_json_is_parse_error_with_null_id() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.post_raw("{\"jsonrpc\": \"2.0\", \"id\": 1,").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(error_code(&body), PARSE_ERROR);
    assert!(body["id"].is_null());
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn test_string_and_numeric_ids_round_trip() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .send_envelope(json!({"jsonrpc": "2.0", "id": "abc-1", "method": "tools/list"}))
        .await;
    assert_eq!(response["id"], "abc-1");

    let response = client
        .send_envelope(json!({"jsonrpc": "2.0", "id": 42, "method": "tools/list"}))
        .await;
    assert_eq!(response["id"], 42);
}

#[tokio::test]
async fn test_missing_method_is_invalid_request() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .send_envelope(json!({"jsonrpc": "2.0", "id": 3}))
        .await;

    assert_eq!(error_code(&response), INVALID_REQUEST);
    assert_eq!(response["id"], 3);
}

#[tokio::test]
async fn test_unknown_method() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.request("prompts/list", None).await;

    assert_eq!(error_code(&response), METHOD_NOT_FOUND);
}

// ============================================================================
// Tools
// ============================================================================

#[tokio::test]
async fn test_tools_list_names_every_tool() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.tools_list().await;
    let tools = response["result"]["tools"].as_array().unwrap();

    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec![
            "create_item",
            "list_items",
            "get_item",
            "update_item",
            "delete_item",
            "bedrock_chat",
            "bedrock_analyze_items",
        ]
    );
    for tool in tools {
        assert!(tool["description"].is_string());
        assert_eq!(tool["inputSchema"]["type"], "object");
    }
}

#[tokio::test]
async fn test_unknown_tool_is_method_not_found() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.call_tool("format_disk", json!({})).await;

    assert_eq!(error_code(&response), METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_tools_call_without_name_is_invalid_params() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .request("tools/call", Some(json!({"arguments": {}})))
        .await;

    assert_eq!(error_code(&response), INVALID_PARAMS);
}

// ============================================================================
// Resources
// ============================================================================

#[tokio::test]
async fn test_resources_list() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.resources_list().await;
    let uris: Vec<&str> = response["result"]["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["uri"].as_str().unwrap())
        .collect();

    assert_eq!(uris, vec!["items://all", "bedrock://models"]);
}

#[tokio::test]
async fn test_read_all_items_resource() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    client.create_item("Plant", "Ficus", "garden").await;

    let response = client.read_resource("items://all").await;
    let content = &response["result"]["contents"][0];

    assert_eq!(content["uri"], "items://all");
    assert_eq!(content["mimeType"], "application/json");
    let items: Vec<Value> = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Plant");
}

#[tokio::test]
async fn test_read_models_resource() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.read_resource("bedrock://models").await;
    let text = response["result"]["contents"][0]["text"].as_str().unwrap();
    let models: Vec<Value> = serde_json::from_str(text).unwrap();

    assert_eq!(models.len(), 2);
    assert_eq!(models[0]["modelId"], "amazon.titan-text-express-v1");
}

#[tokio::test]
async fn test_read_models_resource_upstream_failure() {
    let server = TestServer::spawn_with_inference(ScriptedInference::without_models()).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.read_resource("bedrock://models").await;

    assert_eq!(error_code(&response), UPSTREAM_FAILURE);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("AccessDeniedException"));
}

#[tokio::test]
async fn test_unknown_resource() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.read_resource("items://some").await;

    assert_eq!(error_code(&response), RESOURCE_NOT_FOUND);
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_healthy() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.health().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
    assert!(body["uptime"].is_string());
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_does_not_touch_items() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    client.create_item("Pen", "Blue pen", "office").await;

    client.health().await;

    let response = client.call_tool("list_items", json!({})).await;
    let items: Vec<Value> = serde_json::from_str(&tool_text(&response)).unwrap();
    assert_eq!(items.len(), 1);
}
