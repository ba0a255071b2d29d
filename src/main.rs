use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use socialx::auth::tokens::TokenKeys;
use socialx::config::{Cli, Config};
use socialx::db;
use socialx::feed::SqliteFeedRepository;
use socialx::routes;
use socialx::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;
    if config.server.production {
        tracing::info!("Running in production mode");
    }

    // Keys first, so a misconfigured production start fails before touching the db
    let tokens = TokenKeys::from_config(&config)?;

    // Initialize database
    let pool = db::init(&config)?;
    let repo = Arc::new(SqliteFeedRepository::new(pool));

    let state = AppState::new(&config, repo, tokens);
    let app = routes::app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
