//! gRPC client transport configuration and connection utilities.
//!
//! Channels are built once at start-up and cloned per call; tonic channels
//! multiplex requests, so a clone is the cheap way to share one connection.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tonic::transport::{Channel, Endpoint};
use tracing::Instrument;

fn duration_to_u64_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Connection settings for one downstream gRPC dependency.
///
/// Deserialized from the `identity` / `catalog` sections of service
/// configs; durations are written as human-readable strings (`"10s"`).
/// Usually `#[serde(flatten)]`-ed into a larger client section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrpcClientConfig {
    /// Target URI, e.g. `http://127.0.0.1:50051`.
    pub uri: String,

    /// Timeout for establishing the connection.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Transport-level deadline for a single RPC.
    #[serde(with = "humantime_serde")]
    pub rpc_timeout: Duration,

    /// Connection attempts after the first one before giving up.
    pub max_retries: u32,

    #[serde(with = "humantime_serde")]
    pub base_backoff: Duration,

    #[serde(with = "humantime_serde")]
    pub max_backoff: Duration,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            uri: "http://127.0.0.1:50051".to_owned(),
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: Duration::from_secs(30),
            max_retries: 3,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl GrpcClientConfig {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Backoff before the given (1-based) retry attempt.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        (self.base_backoff * attempt).min(self.max_backoff)
    }

    /// Build a tonic `Endpoint` with timeouts and HTTP/2 keepalive.
    ///
    /// # Errors
    /// Returns an error if `uri` is not a valid URI.
    pub fn endpoint(&self) -> Result<Endpoint, tonic::transport::Error> {
        let endpoint = Endpoint::from_shared(self.uri.clone())?
            .connect_timeout(self.connect_timeout)
            .timeout(self.rpc_timeout)
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .http2_keep_alive_interval(Duration::from_secs(30))
            .keep_alive_timeout(Duration::from_secs(10))
            .keep_alive_while_idle(true);

        Ok(endpoint)
    }
}

/// Connect once to `cfg.uri` and wrap the channel in a generated client.
///
/// # Errors
/// Returns an error if the URI is invalid or the connection cannot be
/// established within `connect_timeout`.
pub async fn connect_with_stack<TClient>(
    service: &'static str,
    cfg: &GrpcClientConfig,
) -> anyhow::Result<TClient>
where
    TClient: From<Channel>,
{
    let span = tracing::debug_span!("grpc_connect", service, uri = %cfg.uri);

    async move {
        let channel = cfg.endpoint()?.connect().await?;
        tracing::info!(
            service,
            connect_timeout_ms = duration_to_u64_ms(cfg.connect_timeout),
            rpc_timeout_ms = duration_to_u64_ms(cfg.rpc_timeout),
            "gRPC client connected"
        );
        Ok(TClient::from(channel))
    }
    .instrument(span)
    .await
}

/// Connect with linear backoff capped at `max_backoff`, up to
/// `max_retries` additional attempts.
///
/// # Errors
/// Returns the last connection error once all attempts are exhausted.
pub async fn connect_with_retry<TClient>(
    service: &'static str,
    cfg: &GrpcClientConfig,
) -> anyhow::Result<TClient>
where
    TClient: From<Channel>,
{
    use anyhow::Context;

    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match connect_with_stack::<TClient>(service, cfg).await {
            Ok(client) => {
                if attempt > 1 {
                    tracing::info!(service, attempt, "gRPC connection established after retries");
                }
                return Ok(client);
            }
            Err(e) if attempt <= cfg.max_retries => {
                let backoff = cfg.backoff_for(attempt);
                tracing::warn!(
                    service,
                    attempt,
                    max_retries = cfg.max_retries,
                    error = %e,
                    backoff_ms = duration_to_u64_ms(backoff),
                    "gRPC connection failed, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                tracing::error!(service, attempt, error = %e, "gRPC connection failed after all retries");
                return Err(e).context(format!(
                    "failed to connect to {service} at {} after {attempt} attempts",
                    cfg.uri
                ));
            }
        }
    }
}

/// Build a client whose channel connects on first use. Only an invalid URI
/// fails here; an unreachable peer surfaces as a per-call transport error.
///
/// # Errors
/// Returns an error if `cfg.uri` is not a valid URI.
pub fn connect_lazy<TClient>(service: &'static str, cfg: &GrpcClientConfig) -> anyhow::Result<TClient>
where
    TClient: From<Channel>,
{
    let channel = cfg.endpoint()?.connect_lazy();
    tracing::debug!(service, uri = %cfg.uri, "gRPC client created with lazy connection");
    Ok(TClient::from(channel))
}
