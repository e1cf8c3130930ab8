use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub logging_level: Option<String>,

    // Backends
    pub items: Option<ItemsConfig>,
    pub bedrock: Option<BedrockConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ItemsConfig {
    pub table_name: Option<String>,
    pub db_path: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub api_key: Option<String>,
    /// Shell command printing the API key, for rotating tokens.
    pub api_key_command: Option<String>,
    pub runtime_url: Option<String>,
    pub control_url: Option<String>,
    pub default_model_id: Option<String>,
    pub inference_timeout_sec: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
