use std::net::SocketAddr;
use std::time::Duration;

use market_bootstrap::{DatabaseConfig, Environment, LoggingConfig, redacted};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Built-in signing secret for local runs. Refused in production.
pub const DEV_JWT_SECRET: &str = "market-local-development-secret";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    pub listen_addr: SocketAddr,
    pub environment: Environment,
    pub database: DatabaseConfig,
    #[serde(serialize_with = "redacted")]
    pub jwt_secret: SecretString,
    #[serde(with = "humantime_serde")]
    pub token_ttl: Duration,
    pub logging: LoggingConfig,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 50051)),
            environment: Environment::Local,
            database: DatabaseConfig::with_url("sqlite://identity.db?mode=rwc"),
            jwt_secret: SecretString::from(DEV_JWT_SECRET),
            token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            logging: LoggingConfig::default(),
        }
    }
}

impl IdentityConfig {
    /// Start-up checks that depend on the environment.
    ///
    /// # Errors
    /// Fails in production when the development secret is still configured
    /// or the secret is empty.
    pub fn validate(&self) -> anyhow::Result<()> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            anyhow::bail!("jwt_secret must not be empty");
        }
        if self.environment.is_production() && secret == DEV_JWT_SECRET {
            anyhow::bail!("refusing to start in production with the development jwt_secret");
        }
        Ok(())
    }
}
