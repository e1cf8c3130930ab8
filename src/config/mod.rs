mod file_config;

pub use file_config::{BedrockConfig, FileConfig, ItemsConfig};

use crate::inference::{default_control_url, default_runtime_url, ApiKeySource, BedrockProvider};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TABLE_NAME: &str = "mcp-items";
pub const DEFAULT_REGION: &str = "us-east-1";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub table_name: String,
    pub db_path: PathBuf,
    pub region: String,
    pub bedrock_api_key: Option<String>,
    pub bedrock_api_key_command: Option<String>,
    pub bedrock_runtime_url: Option<String>,
    pub bedrock_control_url: Option<String>,
    pub default_model_id: String,
    pub inference_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        let server = ServerConfig::default();
        CliConfig {
            port: server.port,
            bind_address: server.bind_address,
            logging_level: server.requests_logging_level,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            db_path: PathBuf::from("items.db"),
            region: DEFAULT_REGION.to_string(),
            bedrock_api_key: None,
            bedrock_api_key_command: None,
            bedrock_runtime_url: None,
            bedrock_control_url: None,
            default_model_id: server.default_model_id,
            inference_timeout_sec: server.inference_timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,

    // Items table
    pub table_name: String,
    pub db_path: PathBuf,

    pub bedrock: BedrockSettings,
}

#[derive(Debug, Clone)]
pub struct BedrockSettings {
    pub region: String,
    pub runtime_url: String,
    pub control_url: String,
    pub api_key_source: ApiKeySource,
    pub default_model_id: String,
    pub inference_timeout: Duration,
}

impl BedrockSettings {
    pub fn provider(&self) -> BedrockProvider {
        BedrockProvider::new(
            self.runtime_url.clone(),
            self.control_url.clone(),
            self.api_key_source.clone(),
        )
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let items = file.items.unwrap_or_default();
        let table_name = items.table_name.unwrap_or_else(|| cli.table_name.clone());
        if table_name.trim().is_empty() {
            bail!("The items table name must not be empty");
        }
        let db_path = items
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());

        let bedrock_file = file.bedrock.unwrap_or_default();
        let region = bedrock_file.region.unwrap_or_else(|| cli.region.clone());
        let runtime_url = bedrock_file
            .runtime_url
            .or_else(|| cli.bedrock_runtime_url.clone())
            .unwrap_or_else(|| default_runtime_url(&region));
        let control_url = bedrock_file
            .control_url
            .or_else(|| cli.bedrock_control_url.clone())
            .unwrap_or_else(|| default_control_url(&region));

        let api_key = bedrock_file
            .api_key
            .or_else(|| cli.bedrock_api_key.clone())
            .filter(|key| !key.is_empty());
        let api_key_command = bedrock_file
            .api_key_command
            .or_else(|| cli.bedrock_api_key_command.clone())
            .filter(|cmd| !cmd.is_empty());
        let api_key_source = match (api_key, api_key_command) {
            (Some(_), Some(_)) => {
                bail!("Only one of the Bedrock API key and the API key command can be set")
            }
            (Some(key), None) => ApiKeySource::Static(key),
            (None, Some(cmd)) => ApiKeySource::Command(cmd),
            (None, None) => ApiKeySource::None,
        };

        let default_model_id = bedrock_file
            .default_model_id
            .unwrap_or_else(|| cli.default_model_id.clone());
        let inference_timeout_sec = bedrock_file
            .inference_timeout_sec
            .unwrap_or(cli.inference_timeout_sec);
        if inference_timeout_sec == 0 {
            bail!("inference_timeout_sec must be greater than zero");
        }

        Ok(Self {
            port,
            bind_address,
            logging_level,
            table_name,
            db_path,
            bedrock: BedrockSettings {
                region,
                runtime_url,
                control_url,
                api_key_source,
                default_model_id,
                inference_timeout: Duration::from_secs(inference_timeout_sec),
            },
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            bind_address: self.bind_address.clone(),
            default_model_id: self.bedrock.default_model_id.clone(),
            inference_timeout: self.bedrock.inference_timeout,
        }
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
