use clap::Parser;
use pkg_api::server::{ServerConfig, start_server};
use pkg_constants::admission::{READY_TIMEOUT_SECS, SHOOT_QUOTA_VALIDATOR};
use pkg_constants::network::{DEFAULT_API_PORT, DEFAULT_BIND_ADDR};
use pkg_constants::paths::{DEFAULT_SERVER_CONFIG, DEFAULT_SERVER_DATA_DIR};
use pkg_types::config::{ServerConfigFile, load_config_file};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "garden-admission",
    about = "Garden API server with shoot quota admission"
)]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = DEFAULT_SERVER_CONFIG)]
    config: String,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory for SlateDB state storage
    #[arg(long)]
    data_dir: Option<String>,

    /// Seconds an admission call waits for the initial cache sync
    #[arg(long)]
    ready_timeout_secs: Option<u64>,

    /// Admission plugins to enable, in order
    #[arg(long, value_delimiter = ',')]
    enable_admission_plugins: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let file_cfg: ServerConfigFile = load_config_file(&cli.config)?;
    info!("Config file: {}", cli.config);

    // Merge: CLI args > config file > defaults
    let port = cli.port.or(file_cfg.port).unwrap_or(DEFAULT_API_PORT);
    let data_dir = cli
        .data_dir
        .or(file_cfg.data_dir)
        .unwrap_or_else(|| DEFAULT_SERVER_DATA_DIR.to_string());
    let ready_timeout_secs = cli
        .ready_timeout_secs
        .or(file_cfg.ready_timeout_secs)
        .unwrap_or(READY_TIMEOUT_SECS);
    let plugins = cli
        .enable_admission_plugins
        .or(file_cfg.enable_admission_plugins)
        .unwrap_or_else(|| vec![SHOOT_QUOTA_VALIDATOR.to_string()]);

    info!("Starting garden-admission");
    info!("  Port:          {}", port);
    info!("  Data dir:      {}", data_dir);
    info!("  Ready timeout: {}s", ready_timeout_secs);
    info!("  Plugins:       {}", plugins.join(","));

    let config = ServerConfig {
        addr: SocketAddr::from((DEFAULT_BIND_ADDR, port)),
        data_dir,
        ready_timeout: Duration::from_secs(ready_timeout_secs),
        enabled_plugins: plugins,
    };

    start_server(config).await?;

    Ok(())
}
