//! HTTP client for the routing provider.
//!
//! Tokens come from a client-credentials exchange and are cached until they
//! are within the configured skew of expiring, then replaced on next use.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::DistanceProviderConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::Coordinates;
use crate::sources::RetryPolicy;

use super::provider::DistanceProvider;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Longest lifetime trusted from a token response.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    distance: f64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// [`DistanceProvider`] backed by the routing provider's HTTP API.
pub struct RoutingClient {
    client: Client,
    config: DistanceProviderConfig,
    client_secret: Option<String>,
    retry: RetryPolicy,
    token: Mutex<Option<CachedToken>>,
}

impl RoutingClient {
    /// Builds a client, reading the secret from the configured variable.
    ///
    /// A missing secret does not fail construction; every credential check
    /// fails instead, so reports keep working without the provider.
    pub fn new(config: &DistanceProviderConfig) -> EngineResult<Self> {
        let client_secret = match config.client_secret() {
            Ok(secret) => Some(secret),
            Err(e) => {
                warn!(
                    error = %e,
                    "Distance backfills are disabled until a client secret is provided"
                );
                None
            }
        };
        Self::build(config, client_secret)
    }

    /// Builds a client with an explicit secret.
    pub fn with_client_secret(
        config: &DistanceProviderConfig,
        client_secret: impl Into<String>,
    ) -> EngineResult<Self> {
        Self::build(config, Some(client_secret.into()))
    }

    fn build(config: &DistanceProviderConfig, client_secret: Option<String>) -> EngineResult<Self> {
        let client = Client::builder()
            .timeout(config.http.timeout())
            .build()
            .map_err(|e| EngineError::Network {
                endpoint: config.route_url.clone(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            config: config.clone(),
            client_secret,
            retry: config.http.retry_policy(),
            token: Mutex::new(None),
        })
    }

    /// Returns a token that is not about to expire, exchanging for a new one
    /// when the cached token is missing or stale.
    async fn access_token(&self) -> EngineResult<String> {
        let mut cached = self.token.lock().await;
        let skew = self.config.token_refresh_skew();

        if let Some(token) = cached.as_ref() {
            let fresh_until = Instant::now().checked_add(skew);
            if fresh_until.is_some_and(|deadline| deadline < token.expires_at) {
                return Ok(token.access_token.clone());
            }
            debug!("Cached routing token is stale, refreshing");
        }

        let fresh = self.exchange_credentials().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn exchange_credentials(&self) -> EngineResult<CachedToken> {
        let secret = self
            .client_secret
            .as_deref()
            .ok_or_else(|| EngineError::Credential {
                message: format!(
                    "client secret variable '{}' is not set",
                    self.config.client_secret_env
                ),
            })?;

        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", secret),
        ];
        if let Some(scope) = self.config.scope.as_deref() {
            form.push(("scope", scope));
        }

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| EngineError::Credential {
                message: format!("token request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Credential {
                message: format!("token endpoint returned {}: {}", status, body),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| EngineError::Credential {
            message: format!("invalid token response: {}", e),
        })?;

        info!(expires_in = token.expires_in, "Obtained routing provider token");

        let now = Instant::now();
        let lifetime = Duration::from_secs(token.expires_in).min(MAX_TOKEN_LIFETIME);
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now.checked_add(lifetime).unwrap_or(now),
        })
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn fetch_route(
        &self,
        token: &str,
        origin: Coordinates,
        destination: Coordinates,
    ) -> EngineResult<f64> {
        let endpoint = self.config.route_url.as_str();
        let query = [
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
        ];

        let response = self
            .client
            .get(endpoint)
            .bearer_auth(token)
            .query(&query)
            .send()
            .await
            .map_err(|e| EngineError::Network {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(EngineError::Credential {
                message: "routing provider rejected the token".to_string(),
            });
        }
        if status.is_server_error() {
            return Err(EngineError::Network {
                endpoint: endpoint.to_string(),
                message: format!("HTTP {}", status),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Provider {
                message: format!("route request returned {}: {}", status, body),
            });
        }

        let body: RouteResponse = response.json().await.map_err(|e| EngineError::Provider {
            message: format!("invalid route response: {}", e),
        })?;

        body.routes
            .first()
            .map(|route| route.distance)
            .ok_or_else(|| EngineError::Provider {
                message: format!("no route between {} and {}", origin, destination),
            })
    }
}

#[async_trait]
impl DistanceProvider for RoutingClient {
    async fn ensure_credential(&self) -> EngineResult<()> {
        self.access_token().await.map(|_| ())
    }

    async fn route_distance_meters(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> EngineResult<f64> {
        let token = self.access_token().await?;
        let token = token.as_str();

        let result = self
            .retry
            .run("route_distance", move || async move {
                self.fetch_route(token, origin, destination).await
            })
            .await;

        if let Err(EngineError::Credential { .. }) = &result {
            self.invalidate_token().await;
        }
        result
    }
}
