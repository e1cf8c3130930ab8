use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mcp_bedrock_server::config::{AppConfig, CliConfig, FileConfig, DEFAULT_REGION, DEFAULT_TABLE_NAME};
use mcp_bedrock_server::inference::InferenceProvider;
use mcp_bedrock_server::server::config::DEFAULT_MODEL_ID;
use mcp_bedrock_server::{run_server, RequestsLoggingLevel, SqliteItemStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[clap(version)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the CLI/env ones.
    #[clap(long, env = "MCP_CONFIG", value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// The address to bind to.
    #[clap(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Name of the items table.
    #[clap(long, env = "ITEMS_TABLE_NAME", default_value = DEFAULT_TABLE_NAME)]
    pub table_name: String,

    /// Path to the SQLite database file holding the items table.
    #[clap(long, env = "ITEMS_DB_PATH", default_value = "items.db", value_parser = parse_path)]
    pub db_path: PathBuf,

    /// AWS region of the Bedrock endpoints.
    #[clap(long, env = "AWS_DEFAULT_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Bedrock API key, sent as a bearer token.
    #[clap(long, env = "AWS_BEARER_TOKEN_BEDROCK", hide_env_values = true)]
    pub bedrock_api_key: Option<String>,

    /// Shell command printing a Bedrock API key, run before each request.
    #[clap(long, env = "BEDROCK_API_KEY_COMMAND")]
    pub bedrock_api_key_command: Option<String>,

    /// Override of the Bedrock runtime endpoint.
    #[clap(long, env = "BEDROCK_RUNTIME_URL")]
    pub bedrock_runtime_url: Option<String>,

    /// Override of the Bedrock control-plane endpoint.
    #[clap(long, env = "BEDROCK_CONTROL_URL")]
    pub bedrock_control_url: Option<String>,

    /// Model used by the Bedrock tools when none is requested.
    #[clap(long, env = "DEFAULT_MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    pub default_model_id: String,

    /// Timeout in seconds for a single inference request.
    #[clap(long, env = "INFERENCE_TIMEOUT_SEC", default_value_t = 120)]
    pub inference_timeout_sec: u64,

    /// The level of logging to perform on each request.
    #[clap(long, env = "REQUESTS_LOGGING_LEVEL", default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            bind_address: self.bind_address.clone(),
            logging_level: self.logging_level.clone(),
            table_name: self.table_name.clone(),
            db_path: self.db_path.clone(),
            region: self.region.clone(),
            bedrock_api_key: self.bedrock_api_key.clone(),
            bedrock_api_key_command: self.bedrock_api_key_command.clone(),
            bedrock_runtime_url: self.bedrock_runtime_url.clone(),
            bedrock_control_url: self.bedrock_control_url.clone(),
            default_model_id: self.default_model_id.clone(),
            inference_timeout_sec: self.inference_timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!(
        "Opening items table '{}' in {:?}...",
        app_config.table_name, app_config.db_path
    );
    let item_store = Arc::new(
        SqliteItemStore::new(&app_config.db_path, &app_config.table_name)
            .context("Failed to open the items table")?,
    );

    let bedrock = &app_config.bedrock;
    info!(
        "Using Bedrock in {} (runtime {}, default model {})",
        bedrock.region, bedrock.runtime_url, bedrock.default_model_id
    );
    let inference = Arc::new(bedrock.provider());

    let probe = inference.clone();
    tokio::spawn(async move {
        match probe.health_check().await {
            Ok(()) => info!("Bedrock is reachable"),
            Err(err) => warn!("Bedrock is not reachable: {}", err),
        }
    });

    run_server(app_config.server_config(), item_store, inference).await
}
