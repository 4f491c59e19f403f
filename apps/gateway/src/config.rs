use std::net::SocketAddr;
use std::time::Duration;

use identity_sdk::IdentityClientConfig;
use market_bootstrap::{Environment, LoggingConfig};
use market_transport_grpc::GrpcClientConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    pub environment: Environment,
    /// Token resolution; `call_timeout` also bounds the middleware.
    pub identity: IdentityClientConfig,
    pub catalog: GrpcClientConfig,
    /// Whole-request bound; exceeded requests get 504.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub logging: LoggingConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            environment: Environment::Local,
            identity: IdentityClientConfig {
                lazy: true,
                ..IdentityClientConfig::default()
            },
            catalog: GrpcClientConfig::new("http://127.0.0.1:50052"),
            request_timeout: Duration::from_secs(30),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use market_bootstrap::load_config;

    #[test]
    fn defaults_and_env_overrides() {
        figment::Jail::expect_with(|jail| {
            let cfg: GatewayConfig = load_config(None, "GATEWAY__").unwrap();
            assert_eq!(cfg.listen_addr.port(), 8080);
            assert_eq!(cfg.catalog.uri, "http://127.0.0.1:50052");
            assert_eq!(cfg.identity.call_timeout, Duration::from_secs(10));

            jail.set_env("GATEWAY__CATALOG__URI", "http://catalog:50052");
            jail.set_env("GATEWAY__IDENTITY__CALL_TIMEOUT", "3s");
            jail.set_env("GATEWAY__REQUEST_TIMEOUT", "1m");
            let cfg: GatewayConfig = load_config(None, "GATEWAY__").unwrap();
            assert_eq!(cfg.catalog.uri, "http://catalog:50052");
            assert_eq!(cfg.identity.call_timeout, Duration::from_secs(3));
            assert_eq!(cfg.request_timeout, Duration::from_secs(60));
            Ok(())
        });
    }
}
