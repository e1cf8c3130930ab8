//! Shared constants for end-to-end tests

// ============================================================================
// Server lifecycle
// ============================================================================

/// Maximum time to wait for a spawned server to answer /health
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness probes
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Timeout for every request made by the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Backends
// ============================================================================

/// Table name used by every test server
pub const TEST_TABLE_NAME: &str = "e2e-items";

/// Default model configured on the test servers
pub const TEST_MODEL_ID: &str = "amazon.titan-text-express-v1";

// ============================================================================
// Protocol
// ============================================================================

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const RESOURCE_NOT_FOUND: i64 = -32004;
pub const UPSTREAM_FAILURE: i64 = -32005;
