use std::sync::Arc;

use crate::api::{AccountClient, IdentityClient};
use crate::client::{IdentityClientConfig, IdentityGrpcClient, UnavailableIdentityClient};

/// Both identity views over one shared client.
#[derive(Clone)]
pub struct IdentityHandles {
    pub resolver: Arc<dyn IdentityClient>,
    pub accounts: Arc<dyn AccountClient>,
}

/// Build the process-wide identity client.
///
/// Construction failure is logged and produces an
/// [`UnavailableIdentityClient`], so the host keeps serving and every
/// identity-dependent call reports the dependency as unavailable.
pub async fn connect_identity(cfg: &IdentityClientConfig) -> IdentityHandles {
    match IdentityGrpcClient::connect(cfg).await {
        Ok(client) => {
            tracing::info!(uri = %cfg.transport.uri, lazy = cfg.lazy, "identity client wired");
            let client = Arc::new(client);
            IdentityHandles {
                resolver: client.clone(),
                accounts: client,
            }
        }
        Err(e) => {
            tracing::error!(
                uri = %cfg.transport.uri,
                error = %format!("{e:#}"),
                "identity client construction failed; identity calls will be rejected"
            );
            let client = Arc::new(UnavailableIdentityClient::new(format!("{e:#}")));
            IdentityHandles {
                resolver: client.clone(),
                accounts: client,
            }
        }
    }
}

/// [`connect_identity`] for hosts that only resolve users.
pub async fn connect_identity_client(cfg: &IdentityClientConfig) -> Arc<dyn IdentityClient> {
    connect_identity(cfg).await.resolver
}
