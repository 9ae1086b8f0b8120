//! Configuration profiles for Strata Cloud Manager clients.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `scm_core::ClientConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use scm_core::config::{ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_TSG_ID};
use scm_core::{ClientConfig, Credentials, TlsVerification};

const KEYRING_SERVICE: &str = "scm";
const ENV_PREFIX: &str = "SCM_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' is not defined")]
    UnknownProfile { profile: String },

    #[error("no {field} configured for profile '{profile}'")]
    NoCredentials { profile: String, field: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named explicitly.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named tenant profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let wanted = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(wanted)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: wanted.to_owned(),
            })
    }
}

/// Timing defaults applied to profiles that do not override them (seconds).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_job_poll_interval")]
    pub job_poll_interval: u64,

    #[serde(default = "default_job_timeout")]
    pub job_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            job_poll_interval: default_job_poll_interval(),
            job_timeout: default_job_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_job_poll_interval() -> u64 {
    10
}
fn default_job_timeout() -> u64 {
    300
}
fn default_true() -> bool {
    true
}

/// A named tenant profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL override.
    pub api_url: Option<String>,

    /// Token endpoint override.
    pub token_url: Option<String>,

    /// Service account client id (plaintext).
    pub client_id: Option<String>,

    /// Environment variable name containing the client id.
    pub client_id_env: Option<String>,

    /// Client secret (plaintext; prefer keyring or env var).
    pub client_secret: Option<String>,

    /// Environment variable name containing the client secret.
    pub client_secret_env: Option<String>,

    /// Tenant service group id.
    pub tsg_id: Option<String>,

    /// Environment variable name containing the TSG id.
    pub tsg_id_env: Option<String>,

    /// Look up the client secret in the system keyring.
    #[serde(default = "default_true")]
    pub use_keyring: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    pub timeout: Option<u64>,
    pub job_poll_interval: Option<u64>,
    pub job_timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: None,
            token_url: None,
            client_id: None,
            client_id_env: None,
            client_secret: None,
            client_secret_env: None,
            tsg_id: None,
            tsg_id_env: None,
            use_keyring: true,
            ca_cert: None,
            insecure: None,
            timeout: None,
            job_poll_interval: None,
            job_timeout: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "paloaltonetworks", "scm").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("scm");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + `SCM_` environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + `SCM_` environment.
///
/// A missing file yields the defaults. Nested keys use `__` in variable
/// names, e.g. `SCM_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Where a resolver may look for one credential field.
struct CredentialSource<'a> {
    field: &'a str,
    profile_env: Option<&'a str>,
    standard_env: &'a str,
    keyring_key: Option<String>,
    plaintext: Option<&'a str>,
}

/// Walk the chain: profile env var → standard env var → keyring → plaintext.
fn resolve_field<E>(
    source: &CredentialSource<'_>,
    profile_name: &str,
    env: &E,
) -> Result<String, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

    if let Some(val) = source.profile_env.and_then(|name| non_empty(env(name))) {
        return Ok(val);
    }
    if let Some(val) = non_empty(env(source.standard_env)) {
        return Ok(val);
    }
    if let Some(key) = source.keyring_key.as_deref() {
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, key) {
            if let Ok(secret) = entry.get_password() {
                return Ok(secret);
            }
        }
    }
    if let Some(val) = source.plaintext.filter(|s| !s.is_empty()) {
        return Ok(val.to_owned());
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
        field: source.field.into(),
    })
}

/// Resolve the client-credentials triple from the process environment,
/// the keyring, and the profile.
pub fn resolve_credentials(profile: &Profile, profile_name: &str) -> Result<Credentials, ConfigError> {
    resolve_credentials_with(profile, profile_name, |name| std::env::var(name).ok())
}

/// Like [`resolve_credentials`] with a custom environment source.
pub fn resolve_credentials_with<E>(
    profile: &Profile,
    profile_name: &str,
    env: E,
) -> Result<Credentials, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let client_id = resolve_field(
        &CredentialSource {
            field: "client_id",
            profile_env: profile.client_id_env.as_deref(),
            standard_env: ENV_CLIENT_ID,
            keyring_key: None,
            plaintext: profile.client_id.as_deref(),
        },
        profile_name,
        &env,
    )?;
    let client_secret = resolve_field(
        &CredentialSource {
            field: "client_secret",
            profile_env: profile.client_secret_env.as_deref(),
            standard_env: ENV_CLIENT_SECRET,
            keyring_key: profile
                .use_keyring
                .then(|| format!("{profile_name}/client-secret")),
            plaintext: profile.client_secret.as_deref(),
        },
        profile_name,
        &env,
    )?;
    let tsg_id = resolve_field(
        &CredentialSource {
            field: "tsg_id",
            profile_env: profile.tsg_id_env.as_deref(),
            standard_env: ENV_TSG_ID,
            keyring_key: None,
            plaintext: profile.tsg_id.as_deref(),
        },
        profile_name,
        &env,
    )?;

    Ok(Credentials {
        client_id,
        client_secret: SecretString::from(client_secret),
        tsg_id,
    })
}

fn validate_url(field: &str, raw: &str) -> Result<(), ConfigError> {
    Url::parse(raw)
        .map(|_| ())
        .map_err(|e| ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL '{raw}': {e}"),
        })
}

/// Build a `ClientConfig` from a profile and the global defaults.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let credentials = resolve_credentials(profile, profile_name)?;
    build_client_config(profile, defaults, credentials)
}

fn build_client_config(
    profile: &Profile,
    defaults: &Defaults,
    credentials: Credentials,
) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::new(credentials);

    if let Some(ref api_url) = profile.api_url {
        validate_url("api_url", api_url)?;
        config.api_url.clone_from(api_url);
    }
    if let Some(ref token_url) = profile.token_url {
        validate_url("token_url", token_url)?;
        config.token_url.clone_from(token_url);
    }

    config.tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.job_poll_interval =
        Duration::from_secs(profile.job_poll_interval.unwrap_or(defaults.job_poll_interval));
    config.job_timeout = Duration::from_secs(profile.job_timeout.unwrap_or(defaults.job_timeout));

    if config.timeout.is_zero() {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(config)
}
