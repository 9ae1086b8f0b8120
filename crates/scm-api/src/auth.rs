// OAuth2 client-credentials authentication
//
// Acquires bearer tokens from the Palo Alto Networks identity service and
// caches them until shortly before expiry. The cache is the only shared
// mutable state in a client; it sits behind an async RwLock so concurrent
// requests on one client see a single refresh.

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Default token endpoint for Strata Cloud Manager tenants.
pub const DEFAULT_TOKEN_URL: &str = "https://auth.apps.paloaltonetworks.com/am/oauth2/access_token";

/// Refresh a cached token this long before it actually expires.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Client-credentials triple for one tenant service group (TSG).
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub tsg_id: String,
}

impl ClientCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tsg_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            tsg_id: tsg_id.into(),
        }
    }

    /// OAuth2 scope string for this tenant.
    pub fn scope(&self) -> String {
        format!("tsg_id:{}", self.tsg_id)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Where a token handed out by [`TokenManager`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Reused from an earlier acquisition.
    Cached,
    /// Requested from the identity service for this call.
    Issued,
}

struct CachedToken {
    token: SecretString,
    /// Refresh deadline (expiry minus the refresh margin).
    refresh_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

/// Token acquisition and caching for the client-credentials grant.
pub struct TokenManager {
    http: reqwest::Client,
    token_url: Url,
    credentials: ClientCredentials,
    refresh_margin: Duration,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(
        http: reqwest::Client,
        token_url: Url,
        credentials: ClientCredentials,
        refresh_margin: Duration,
    ) -> Self {
        Self {
            http,
            token_url,
            credentials,
            refresh_margin,
            cache: RwLock::new(None),
        }
    }

    /// The tenant this manager issues tokens for.
    pub fn tsg_id(&self) -> &str {
        &self.credentials.tsg_id
    }

    /// Return a valid access token, acquiring a new one when the cached
    /// token is missing or inside the refresh margin.
    pub async fn access_token(&self) -> Result<SecretString, Error> {
        self.access_token_with_source().await.map(|(token, _)| token)
    }

    /// Like [`access_token`](Self::access_token), also reporting whether
    /// the token was served from the cache or issued for this call.
    pub async fn access_token_with_source(&self) -> Result<(SecretString, TokenSource), Error> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
                return Ok((cached.token.clone(), TokenSource::Cached));
            }
        }

        let mut cache = self.cache.write().await;
        // Another caller may have refreshed while we waited for the write lock.
        if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
            return Ok((cached.token.clone(), TokenSource::Cached));
        }

        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok((token, TokenSource::Issued))
    }

    /// Drop the cached token so the next request acquires a new one.
    pub async fn invalidate(&self) {
        debug!("invalidating cached access token");
        *self.cache.write().await = None;
    }

    async fn request_token(&self) -> Result<CachedToken, Error> {
        debug!(tsg_id = %self.credentials.tsg_id, "requesting access token at {}", self.token_url);

        let scope = self.credentials.scope();
        let form = [
            ("grant_type", "client_credentials"),
            ("scope", scope.as_str()),
        ];

        let resp = self
            .http
            .post(self.token_url.clone())
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.expose_secret()),
            )
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<TokenErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or_else(|| {
                    if body.is_empty() {
                        status.to_string()
                    } else {
                        body.clone()
                    }
                });
            return Err(Error::Authentication {
                message: format!("token request failed (HTTP {status}): {message}"),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Authentication {
                message: format!("malformed token response: {e}"),
            })?;

        if let Some(kind) = parsed.token_type.as_deref() {
            if !kind.eq_ignore_ascii_case("bearer") {
                return Err(Error::Authentication {
                    message: format!("unsupported token type '{kind}'"),
                });
            }
        }

        // Tokens without an expiry are re-acquired after 15 minutes, the
        // identity service's standard lifetime.
        let lifetime = Duration::from_secs(parsed.expires_in.unwrap_or(900));
        let refresh_at = Instant::now() + lifetime.saturating_sub(self.refresh_margin);

        debug!(
            "access token acquired, refresh in {}s",
            lifetime.saturating_sub(self.refresh_margin).as_secs()
        );

        Ok(CachedToken {
            token: SecretString::from(parsed.access_token),
            refresh_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_embeds_tsg_id() {
        let creds = ClientCredentials::new("id", "secret", "1234567890");
        assert_eq!(creds.scope(), "tsg_id:1234567890");
    }

    #[test]
    fn cached_token_past_refresh_deadline_is_stale() {
        let stale = CachedToken {
            token: SecretString::from("t".to_owned()),
            refresh_at: Instant::now(),
        };
        assert!(!stale.is_fresh());

        let fresh = CachedToken {
            token: SecretString::from("t".to_owned()),
            refresh_at: Instant::now() + Duration::from_secs(60),
        };
        assert!(fresh.is_fresh());
    }
}
