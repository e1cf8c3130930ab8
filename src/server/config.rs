use std::time::Duration;

use super::RequestsLoggingLevel;

pub const DEFAULT_MODEL_ID: &str = "amazon.titan-text-express-v1";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub bind_address: String,
    /// Model used by the Bedrock tools when the caller does not pick one.
    pub default_model_id: String,
    pub inference_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 8000,
            bind_address: "0.0.0.0".to_string(),
            default_model_id: DEFAULT_MODEL_ID.to_string(),
            inference_timeout: Duration::from_secs(120),
        }
    }
}
