use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use auth_relay::config::AppConfig;
use auth_relay::database::PgProfileStore;
use auth_relay::provider::GoTrueProvider;
use auth_relay::{app, AppState};

#[derive(Debug, Parser)]
#[command(name = "auth-relay", version, about = "Cookie-session auth API in front of a managed auth provider")]
struct Args {
    /// Port to listen on (overrides PORT / APP_PORT from the environment)
    #[arg(long, short)]
    port: Option<u16>,

    /// Skip creating the profile table at startup
    #[arg(long, env = "SKIP_MIGRATIONS")]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up AUTH_PROVIDER_URL, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("auth_relay=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting auth-relay in {:?} mode", config.environment);

    let provider = GoTrueProvider::new(&config.provider).context("failed to build auth provider client")?;
    let profiles = PgProfileStore::connect(&config.database)
        .await
        .context("failed to connect to profile database")?;
    if !args.skip_migrations {
        profiles.migrate().await.context("failed to prepare profile table")?;
    }

    let state = AppState::from_config(&config, Arc::new(provider), Arc::new(profiles));
    let router = app(state, &config.security.cors_origins);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("auth-relay listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
