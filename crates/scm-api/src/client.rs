// Hand-crafted async HTTP client for the Strata Cloud Manager REST API.
//
// Base URL: https://api.strata.paloaltonetworks.com
// Auth: OAuth2 bearer token (client-credentials grant, see `auth`)

use std::future::Future;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{TokenManager, TokenSource};
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{self, ErrorEnvelope, Page};

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.strata.paloaltonetworks.com";

/// Async client for the SCM REST API.
///
/// Attaches `Authorization: Bearer <token>` to every request when built with
/// a [`TokenManager`]. A request answered with 401 while carrying a cached
/// token is re-sent once with a freshly acquired token; no other request is
/// ever repeated.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Option<TokenManager>,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a transport config and a token manager.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        auth: TokenManager,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            auth: Some(auth),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            auth: None,
        })
    }

    /// Ensure the base URL ends with a single `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an endpoint path (e.g. `"/config/objects/v1/addresses"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request dispatch ─────────────────────────────────────────────

    /// Send a request built by `build`, attaching the bearer token.
    ///
    /// `build` is called a second time only for the single 401 re-send,
    /// and only when the rejected token came from the cache.
    async fn send<F>(&self, build: F) -> Result<reqwest::Response, Error>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let Some(auth) = self.auth.as_ref() else {
            return Ok(build(&self.http).send().await?);
        };

        let (token, source) = auth.access_token_with_source().await?;
        let resp = build(&self.http)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        if resp.status() != StatusCode::UNAUTHORIZED || source == TokenSource::Issued {
            return Ok(resp);
        }

        debug!("request rejected with 401, re-acquiring access token");
        auth.invalidate().await;
        let token = auth.access_token().await?;
        Ok(build(&self.http)
            .bearer_auth(token.expose_secret())
            .send()
            .await?)
    }

    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("{method} {url} params={params:?}");

        let resp = self
            .send(|http| {
                let req = http.request(method.clone(), url.clone()).query(params);
                match body {
                    Some(b) => req.json(b),
                    None => req,
                }
            })
            .await?;
        self.handle_response(resp).await
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request::<T, ()>(Method::GET, path, &[], None).await
    }

    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        self.request::<T, ()>(Method::GET, path, params, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.send(|http| http.delete(url.clone())).await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            trace!("response body: {body}");
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let envelope = serde_json::from_str::<ErrorEnvelope>(&raw).ok();
        let first = envelope.as_ref().and_then(|e| e.errors.first());

        if let Some(env) = envelope.as_ref() {
            if let Some(request_id) = env.request_id.as_deref() {
                debug!(%request_id, "API error response (HTTP {status})");
            }
        }

        let message = first
            .and_then(types::ApiErrorEntry::best_message)
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.clone()
                }
            });

        if status == StatusCode::UNAUTHORIZED {
            return Error::Unauthorized {
                status: status.as_u16(),
                message,
            };
        }

        Error::Api {
            status: status.as_u16(),
            message,
            code: first.and_then(|e| e.code.clone()),
            error_type: first.and_then(types::ApiErrorEntry::error_type),
            details: first.and_then(|e| e.details.clone()),
        }
    }

    // ── Pagination helper ────────────────────────────────────────────

    /// Collect all pages into a single `Vec<T>`.
    ///
    /// Requests pages of `limit` records, advancing `offset` by the number of
    /// records received. Stops on a short page, or once the accumulated count
    /// reaches the server-reported `total`. Any page failure aborts the whole
    /// collection.
    pub async fn paginate_all<T, F, Fut>(&self, limit: u32, fetch: F) -> Result<Vec<T>, Error>
    where
        F: Fn(u64, u32) -> Fut,
        Fut: Future<Output = Result<Page<T>, Error>>,
    {
        let mut all = Vec::new();
        let mut offset: u64 = 0;
        let limit_usize = usize::try_from(limit).unwrap_or(usize::MAX);

        loop {
            let page = fetch(offset, limit).await?;
            let received = page.data.len();
            all.extend(page.data);

            debug!(
                "page at offset {offset}: {received} records ({} total so far)",
                all.len()
            );

            let reached_total = page
                .total
                .is_some_and(|total| u64::try_from(all.len()).unwrap_or(u64::MAX) >= total);
            if received < limit_usize || received == 0 || reached_total {
                break;
            }

            offset += u64::try_from(received).unwrap_or(u64::MAX);
        }

        Ok(all)
    }

    /// Fetch one page of a collection endpoint with extra query parameters.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        path: &str,
        offset: u64,
        limit: u32,
        extra: &[(&str, String)],
    ) -> Result<Page<T>, Error> {
        let mut params: Vec<(&str, String)> =
            vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        params.extend(extra.iter().cloned());
        self.get_with_params(path, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = ApiClient::from_reqwest("https://api.example.com/prefix", reqwest::Client::new())
            .expect("valid base url");
        assert_eq!(client.base_url().as_str(), "https://api.example.com/prefix/");
    }

    #[test]
    fn endpoint_paths_join_under_base() {
        let client = ApiClient::from_reqwest("https://api.example.com/", reqwest::Client::new())
            .expect("valid base url");
        let url = client
            .url("/config/objects/v1/addresses")
            .expect("valid path");
        assert_eq!(
            url.as_str(),
            "https://api.example.com/config/objects/v1/addresses"
        );
    }
}
