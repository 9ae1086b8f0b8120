//! Typed configuration services for Strata Cloud Manager.
//!
//! This crate sits on top of `scm-api` and owns the domain model and the
//! list/fetch contract shared by every resource type:
//!
//! - **[`Scm`]**: Facade holding one service per resource type plus
//!   [`OperationsService`] for commits and jobs. Built from a
//!   [`ClientConfig`]; every service shares one authenticated client.
//!
//! - **[`ResourceService<R>`]**: `create` / `get` / `update` / `delete` /
//!   `list` / `fetch`, written once against the [`Resource`] trait.
//!   `list()` paginates the whole collection, then applies exact-match,
//!   exclusion, and typed attribute filters in that order.
//!
//! - **[`Container`]**: Exactly one of folder, snippet, or device. Invalid
//!   combinations are rejected before any request is sent.
//!
//! - **Domain model** ([`model`]): Response models, create payloads, and
//!   typed filters. Mutually exclusive wire fields are enums.

pub mod client;
pub mod config;
pub mod container;
pub mod error;
pub mod filter;
pub mod model;
pub mod operations;
pub mod resource;
pub mod service;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::Scm;
pub use config::{ClientConfig, Credentials, TlsVerification};
pub use container::{Container, ContainerFields, ContainerKind};
pub use error::{CoreError, ErrorKind};
pub use filter::{AttributeFilter, ListQuery, NoFilter};
pub use operations::{
    CommitOutcome, CommitRequest, CommitResponse, Job, JobParent, JobStatus, OperationsService,
    WaitOptions,
};
pub use resource::{Resource, ResourceKind, SERVER_MAX_LIMIT, Validate};
pub use service::ResourceService;

pub use scm_api::Page;
pub use tokio_util::sync::CancellationToken;
