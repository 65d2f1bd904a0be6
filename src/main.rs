//! market-server: loads configuration, opens storage and serves the API
//!
//! Usage: `market-server [config.yaml]`

use anyhow::Result;
use market::config::AppConfig;
use market::server::ServerBuilder;
use market::storage::DirFileStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1);
    let config = AppConfig::load(config_path.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let bind = config.server.socket_addr()?.to_string();
    if config.redis_addr.is_some() {
        tracing::info!("redis_addr is set but no cache is wired in; ignoring");
    }

    let files = DirFileStore::open(&config.upload_dir).await?;
    tracing::info!(dir = %config.upload_dir.display(), "upload directory ready");

    let builder = ServerBuilder::new().with_file_store(files);
    let builder = with_store(builder, &config).await?;

    tracing::info!("Starting market-server");
    builder.with_config(config).serve(&bind).await?;
    tracing::info!("market-server stopped");
    Ok(())
}

#[cfg(feature = "mysql")]
async fn with_store(builder: ServerBuilder, config: &AppConfig) -> Result<ServerBuilder> {
    let store = market::storage::MysqlStore::connect(&config.database.dsn).await?;
    tracing::info!("connected to MySQL");
    Ok(builder.with_store(store))
}

#[cfg(not(feature = "mysql"))]
async fn with_store(builder: ServerBuilder, _config: &AppConfig) -> Result<ServerBuilder> {
    tracing::info!("using in-memory storage; data is lost on restart");
    Ok(builder.with_store(market::storage::InMemoryStore::new()))
}
