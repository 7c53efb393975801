use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fretefacil_bi_api::{config, database::DatabaseManager, routes, state::AppState};

#[derive(Parser)]
#[command(name = "fretefacil-bi-api")]
#[command(about = "BI-FreteFacil API server - multi-tenant BI endpoints over FreteFacil ERP databases")]
#[command(version)]
struct Cli {
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0", help = "Address to bind")]
    host: String,

    #[arg(long, help = "Port to bind (falls back to API_PORT, then PORT, then 8000)")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET, etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let settings = config::config();
    tracing::info!("Starting BI-FreteFacil API in {:?} mode", settings.environment);

    if settings.security.jwt_secret.is_empty() {
        if fretefacil_bi_api::is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("JWT_SECRET is not set; login and /bi/* requests will fail");
    }

    let port = cli
        .port
        .or_else(|| env_port("API_PORT"))
        .or_else(|| env_port("PORT"))
        .unwrap_or(8000);

    let bind_addr = format!("{}:{}", cli.host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("BI-FreteFacil API listening on http://{}", bind_addr);

    axum::serve(listener, routes::app(AppState::firebird()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close_all().await;
    Ok(())
}

fn env_port(name: &str) -> Option<u16> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
