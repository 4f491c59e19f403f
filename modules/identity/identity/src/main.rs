use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use identity::domain::model::UserRecord;
use identity::domain::passwords::hash_password;
use identity::domain::validation::{validate_email, validate_password};
use identity::domain::repo::UsersRepository;
use identity::infra::storage::{Migrator, SeaOrmUsersRepository};
use identity::{IdentityConfig, IdentityService, TokenCodec, UserServiceImpl};
use identity_sdk::UserServiceServer;
use market_bootstrap::{CommonArgs, init_logging, load_config, shutdown_signal, to_yaml};
use sea_orm_migration::MigratorTrait;

/// Identity service - user profiles and bearer token resolution
#[derive(Parser)]
#[command(name = "identity-server")]
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
    /// Create a user profile and print its id
    AddUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Enables email sign-in for the account
        #[arg(long)]
        password: Option<String>,
    },
    /// Print a bearer token for an existing user
    IssueToken {
        #[arg(long)]
        user_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // defaults -> YAML (if provided) -> env (IDENTITY__*)
    let config: IdentityConfig = load_config(cli.common.config.as_deref(), "IDENTITY__")?;
    init_logging(&config.logging, cli.common.verbose);

    if cli.common.print_config {
        println!("Effective configuration:\n{}", to_yaml(&config)?);
        return Ok(());
    }
    config.validate()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::Check => {
            println!("Configuration is valid");
            Ok(())
        }
        Commands::AddUser {
            name,
            email,
            password,
        } => {
            validate_email(&email)?;
            let mut user = UserRecord::new(name, email);
            if let Some(password) = password {
                validate_password(&password)?;
                user = user.with_password_hash(hash_password(&password)?);
            }
            let repo = open_repository(&config).await?;
            let user = repo.insert(user).await.context("failed to create user")?;
            println!("{}", user.id);
            Ok(())
        }
        Commands::IssueToken { user_id } => {
            let repo = open_repository(&config).await?;
            if repo.find_by_id(&user_id).await?.is_none() {
                anyhow::bail!("user {user_id} does not exist");
            }
            let codec = TokenCodec::new(&config.jwt_secret, config.token_ttl);
            println!("{}", codec.issue(&user_id)?);
            Ok(())
        }
    }
}

async fn open_repository(config: &IdentityConfig) -> Result<SeaOrmUsersRepository> {
    let db = config
        .database
        .connect()
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;
    Ok(SeaOrmUsersRepository::new(db))
}

async fn run(config: IdentityConfig) -> Result<()> {
    let repo = open_repository(&config).await?;
    let tokens = TokenCodec::new(&config.jwt_secret, config.token_ttl);
    let service = Arc::new(IdentityService::new(Arc::new(repo), tokens));

    tracing::info!(addr = %config.listen_addr, environment = ?config.environment, "identity service starting");

    tonic::transport::Server::builder()
        .add_service(UserServiceServer::new(UserServiceImpl::new(service)))
        .serve_with_shutdown(config.listen_addr, shutdown_signal())
        .await
        .context("gRPC server failed")?;

    tracing::info!("identity service stopped");
    Ok(())
}
