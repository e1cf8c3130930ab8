//! Shared harness for the end-to-end suites
//!
//! Suites declare `mod common;` and use the re-exports below:
//!
//! ```no_run
//! mod common;
//! use common::{TestClient, TestServer};
//!
//! #[tokio::test]
//! async fn test_create_item() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let id = client.create_item("Lamp", "Desk lamp", "office").await;
//!     assert!(server.item_store.get_item(&id).unwrap().is_some());
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Not every suite uses every helper.
#[allow(unused_imports)]
pub use client::{error_code, is_tool_error, tool_text, TestClient};
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{directive_reply, RecordedPrompt, ScriptedInference};
#[allow(unused_imports)]
pub use server::TestServer;
