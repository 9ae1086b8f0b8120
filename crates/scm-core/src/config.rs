// ── Runtime client configuration ──
//
// Describes how to reach one tenant: endpoints, credentials, TLS, and
// timing. Built by the caller (or by `scm-config` from a profile); this
// module never touches disk.

use std::path::PathBuf;
use std::time::Duration;

use scm_api::{ClientCredentials, DEFAULT_API_URL, DEFAULT_REFRESH_MARGIN, DEFAULT_TOKEN_URL};
use secrecy::SecretString;

use crate::error::CoreError;
use crate::operations::{DEFAULT_JOB_TIMEOUT, DEFAULT_POLL_INTERVAL, WaitOptions};

pub const ENV_CLIENT_ID: &str = "CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const ENV_TSG_ID: &str = "TSG_ID";

/// OAuth2 client-credentials for one tenant service group.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub tsg_id: String,
}

impl Credentials {
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

    fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [("client_id", &self.client_id), ("tsg_id", &self.tsg_id)] {
            if value.trim().is_empty() {
                return Err(CoreError::Config {
                    message: format!("{field} is required"),
                });
            }
        }
        Ok(())
    }
}

impl From<Credentials> for ClientCredentials {
    fn from(c: Credentials) -> Self {
        Self {
            client_id: c.client_id,
            client_secret: c.client_secret,
            tsg_id: c.tsg_id,
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Extra CA certificate file, for TLS-inspecting proxies.
    CustomCa(PathBuf),
    /// Skip verification. Test proxies only.
    DangerAcceptInvalid,
}

/// Everything needed to build an [`Scm`](crate::Scm) client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (default `https://api.strata.paloaltonetworks.com`).
    pub api_url: String,
    /// OAuth2 token endpoint.
    pub token_url: String,
    pub credentials: Credentials,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Refresh the access token this long before it expires.
    pub token_refresh_margin: Duration,
    /// Default interval between job polls.
    pub job_poll_interval: Duration,
    /// Default deadline for `wait_for_job`.
    pub job_timeout: Duration,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            token_url: DEFAULT_TOKEN_URL.to_owned(),
            credentials,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            token_refresh_margin: DEFAULT_REFRESH_MARGIN,
            job_poll_interval: DEFAULT_POLL_INTERVAL,
            job_timeout: DEFAULT_JOB_TIMEOUT,
        }
    }

    /// Read `CLIENT_ID`, `CLIENT_SECRET`, and `TSG_ID` from the environment.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| CoreError::Config {
                    message: format!("environment variable {key} is not set"),
                })
        };
        let credentials = Credentials::new(
            get(ENV_CLIENT_ID)?,
            get(ENV_CLIENT_SECRET)?,
            get(ENV_TSG_ID)?,
        );
        Ok(Self::new(credentials))
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.credentials.validate()?;
        if self.timeout.is_zero() {
            return Err(CoreError::Config {
                message: "timeout must be greater than zero".into(),
            });
        }
        if self.job_poll_interval.is_zero() {
            return Err(CoreError::Config {
                message: "job_poll_interval must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Job wait defaults derived from this config.
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::default()
            .timeout(self.job_timeout)
            .interval(self.job_poll_interval)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn reads_credentials_from_lookup() {
        let vars = env(&[
            ("CLIENT_ID", "svc@1234567890.iam.panserviceaccount.com"),
            ("CLIENT_SECRET", "s3cret"),
            ("TSG_ID", "1234567890"),
        ]);
        let config = ClientConfig::from_lookup(|k| vars.get(k).cloned()).expect("complete env");
        assert_eq!(config.credentials.tsg_id, "1234567890");
        assert_eq!(config.credentials.client_secret.expose_secret(), "s3cret");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_variable_is_a_config_error() {
        let vars = env(&[("CLIENT_ID", "svc"), ("TSG_ID", "1")]);
        let err = ClientConfig::from_lookup(|k| vars.get(k).cloned()).expect_err("no secret");
        assert!(err.to_string().contains("CLIENT_SECRET"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = ClientConfig::new(Credentials::new("svc", "s", "1"));
        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
