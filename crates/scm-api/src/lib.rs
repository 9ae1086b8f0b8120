// scm-api: Async Rust transport for the Strata Cloud Manager REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::{
    ClientCredentials, DEFAULT_REFRESH_MARGIN, DEFAULT_TOKEN_URL, TokenManager, TokenSource,
};
pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{FetchResponse, Page};
