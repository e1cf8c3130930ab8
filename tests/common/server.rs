//! Bridge instances for end-to-end tests
//!
//! Every `TestServer` runs the real router on its own port, backed by a fresh
//! SQLite items table and a scripted inference provider.

use super::constants::*;
use super::fixtures::ScriptedInference;
use mcp_bedrock_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use mcp_bedrock_server::{ItemStore, SqliteItemStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub struct TestServer {
    /// e.g. "http://127.0.0.1:40123"
    pub base_url: String,

    #[allow(dead_code)]
    pub port: u16,

    /// Same store the server uses, for seeding and asserting.
    #[allow(dead_code)]
    pub item_store: Arc<dyn ItemStore>,

    /// Queue replies here and inspect the prompts the tools sent.
    #[allow(dead_code)]
    pub inference: Arc<ScriptedInference>,

    // Held until drop: the database directory and the shutdown trigger.
    _db_dir: TempDir,
    _stop: Option<oneshot::Sender<()>>,
}

fn test_config(port: u16) -> ServerConfig {
    ServerConfig {
        requests_logging_level: RequestsLoggingLevel::None,
        port,
        bind_address: "127.0.0.1".to_string(),
        default_model_id: TEST_MODEL_ID.to_string(),
        inference_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
    }
}

impl TestServer {
    /// Server whose inference provider has no queued replies.
    pub async fn spawn() -> Self {
        Self::spawn_with_inference(ScriptedInference::default()).await
    }

    /// Starts a server on an ephemeral port and returns once /health answers.
    ///
    /// Panics on any setup failure.
    pub async fn spawn_with_inference(inference: ScriptedInference) -> Self {
        let db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SqliteItemStore::new(db_dir.path().join("items.db"), TEST_TABLE_NAME)
            .expect("Failed to open item store");
        let item_store: Arc<dyn ItemStore> = Arc::new(store);
        let inference = Arc::new(inference);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind an ephemeral port");
        let port = listener
            .local_addr()
            .expect("Listener has no local address")
            .port();

        let app = make_app(test_config(port), item_store.clone(), inference.clone());
        let (stop, stopped) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async move {
                let _ = stopped.await;
            };
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                panic!("Test server crashed: {}", err);
            }
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            port,
            item_store,
            inference,
            _db_dir: db_dir,
            _stop: Some(stop),
        };
        server.wait_until_healthy().await;
        server
    }

    async fn wait_until_healthy(&self) {
        let client = reqwest::Client::new();
        let url = format!("{}/health", self.base_url);

        let probe = async {
            loop {
                let healthy = client
                    .get(&url)
                    .timeout(Duration::from_millis(100))
                    .send()
                    .await
                    .map(|r| r.status().is_success())
                    .unwrap_or(false);
                if healthy {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
            }
        };

        if tokio::time::timeout(Duration::from_millis(SERVER_READY_TIMEOUT_MS), probe)
            .await
            .is_err()
        {
            panic!("{} not healthy after {}ms", url, SERVER_READY_TIMEOUT_MS);
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(stop) = self._stop.take() {
            let _ = stop.send(());
        }
    }
}
