use std::net::SocketAddr;

use identity_sdk::IdentityClientConfig;
use market_bootstrap::{DatabaseConfig, Environment, LoggingConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub listen_addr: SocketAddr,
    pub environment: Environment,
    pub database: DatabaseConfig,
    /// Where owner identities are resolved.
    pub identity: IdentityClientConfig,
    pub logging: LoggingConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 50052)),
            environment: Environment::Local,
            database: DatabaseConfig::with_url("sqlite://catalog.db?mode=rwc"),
            identity: IdentityClientConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use super::*;
    use market_bootstrap::load_config;

    #[test]
    fn env_overrides_nested_sections() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "catalog.yaml",
                "listen_addr: \"127.0.0.1:6000\"\nidentity:\n  uri: \"http://identity:50051\"\n  call_timeout: \"2s\"\n",
            )?;
            jail.set_env("CATALOG__DATABASE__QUERY_TIMEOUT", "750ms");
            jail.set_env("CATALOG__IDENTITY__LAZY", "true");

            let cfg: CatalogConfig =
                load_config(Some(std::path::Path::new("catalog.yaml")), "CATALOG__").unwrap();
            assert_eq!(cfg.listen_addr.port(), 6000);
            assert_eq!(cfg.identity.transport.uri, "http://identity:50051");
            assert_eq!(cfg.identity.call_timeout, Duration::from_secs(2));
            assert!(cfg.identity.lazy);
            assert_eq!(cfg.database.query_timeout, Duration::from_millis(750));
            assert_eq!(cfg.database.url, "sqlite://catalog.db?mode=rwc");
            Ok(())
        });
    }
}
