use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_sdk::CatalogGrpcClient;
use clap::Parser;
use gateway::{AppState, GatewayConfig, build_app};
use identity_sdk::connect_identity;
use market_bootstrap::{CommonArgs, init_logging, load_config, shutdown_signal, to_yaml};

/// Edge gateway - token resolution and package routes over HTTP
#[derive(Parser)]
#[command(name = "gateway")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // defaults -> YAML (if provided) -> env (GATEWAY__*)
    let config: GatewayConfig = load_config(cli.common.config.as_deref(), "GATEWAY__")?;
    init_logging(&config.logging, cli.common.verbose);

    if cli.common.print_config {
        println!("Effective configuration:\n{}", to_yaml(&config)?);
        return Ok(());
    }

    let identity = connect_identity(&config.identity).await;
    let catalog = CatalogGrpcClient::connect(&config.catalog).context("invalid catalog uri")?;

    let state = AppState {
        identity: identity.resolver,
        accounts: identity.accounts,
        catalog: Arc::new(catalog),
        resolve_timeout: config.identity.call_timeout,
    };
    let app = build_app(state, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, environment = ?config.environment, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("gateway stopped");
    Ok(())
}
