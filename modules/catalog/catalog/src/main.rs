use std::sync::Arc;

use anyhow::{Context, Result};
use catalog::infra::storage::{Migrator, SeaOrmCatalogStore};
use catalog::{CatalogConfig, PackageAggregator, PackageServiceImpl, TagCatalog};
use catalog_sdk::PackageServiceServer;
use clap::{Parser, Subcommand};
use identity_sdk::connect_identity_client;
use market_bootstrap::{CommonArgs, init_logging, load_config, shutdown_signal, to_yaml};
use sea_orm_migration::MigratorTrait;

/// Catalog service - packages, tags and owner enrichment
#[derive(Parser)]
#[command(name = "catalog-server")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gRPC server
    Run,
    /// Validate configuration and exit
    Check,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // defaults -> YAML (if provided) -> env (CATALOG__*)
    let config: CatalogConfig = load_config(cli.common.config.as_deref(), "CATALOG__")?;
    init_logging(&config.logging, cli.common.verbose);

    if cli.common.print_config {
        println!("Effective configuration:\n{}", to_yaml(&config)?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::Check => {
            println!("Configuration is valid");
            Ok(())
        }
        Commands::Migrate => {
            open_store(&config).await?;
            println!("Migrations applied");
            Ok(())
        }
    }
}

async fn open_store(config: &CatalogConfig) -> Result<SeaOrmCatalogStore> {
    let db = config
        .database
        .connect()
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;
    Ok(SeaOrmCatalogStore::new(db, config.database.query_timeout))
}

async fn run(config: CatalogConfig) -> Result<()> {
    let store = Arc::new(open_store(&config).await?);
    let identity = connect_identity_client(&config.identity).await;

    let packages = Arc::new(PackageAggregator::new(store.clone(), identity));
    let tags = Arc::new(TagCatalog::new(store));

    tracing::info!(addr = %config.listen_addr, environment = ?config.environment, "catalog service starting");

    tonic::transport::Server::builder()
        .add_service(PackageServiceServer::new(PackageServiceImpl::new(packages, tags)))
        .serve_with_shutdown(config.listen_addr, shutdown_signal())
        .await
        .context("gRPC server failed")?;

    tracing::info!("catalog service stopped");
    Ok(())
}
