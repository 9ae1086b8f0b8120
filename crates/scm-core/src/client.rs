// ── Unified client facade ──
//
// `Scm` owns one authenticated `ApiClient` and exposes every resource
// service plus the operations service as fields. All services are built
// up front and share the same client and token cache.

use std::sync::Arc;

use scm_api::{ApiClient, TlsMode, TokenManager, TransportConfig};
use tracing::debug;
use url::Url;

use crate::config::{ClientConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    Address, AddressGroup, Application, ApplicationGroup, ExternalDynamicList, HipObject,
    HipProfile, LogForwardingProfile, Region, Schedule, Service, ServiceGroup, Tag,
};
use crate::operations::{OperationsService, WaitOptions};
use crate::service::ResourceService;

/// Strata Cloud Manager client.
#[derive(Clone)]
pub struct Scm {
    api: Arc<ApiClient>,
    tsg_id: Option<String>,

    pub address: ResourceService<Address>,
    pub address_group: ResourceService<AddressGroup>,
    pub tag: ResourceService<Tag>,
    pub service: ResourceService<Service>,
    pub service_group: ResourceService<ServiceGroup>,
    pub application: ResourceService<Application>,
    pub application_group: ResourceService<ApplicationGroup>,
    pub external_dynamic_list: ResourceService<ExternalDynamicList>,
    pub log_forwarding_profile: ResourceService<LogForwardingProfile>,
    pub schedule: ResourceService<Schedule>,
    pub region: ResourceService<Region>,
    pub hip_object: ResourceService<HipObject>,
    pub hip_profile: ResourceService<HipProfile>,
    pub operations: OperationsService,
}

impl Scm {
    /// Build a client from runtime configuration.
    ///
    /// No request is made here; the first token is acquired lazily by the
    /// first API call.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.timeout,
        };
        let token_url = Url::parse(&config.token_url).map_err(|e| CoreError::Config {
            message: format!("invalid token URL '{}': {e}", config.token_url),
        })?;
        let wait = config.wait_options();
        let tsg_id = config.credentials.tsg_id.clone();

        let auth = TokenManager::new(
            transport.build_client()?,
            token_url,
            config.credentials.into(),
            config.token_refresh_margin,
        );
        let api = ApiClient::new(&config.api_url, &transport, auth)?;
        debug!(%tsg_id, base_url = %api.base_url(), "client constructed");

        let mut scm = Self::assemble(Arc::new(api), wait);
        scm.tsg_id = Some(tsg_id);
        Ok(scm)
    }

    /// Wrap an already-built [`ApiClient`] with default job wait options.
    pub fn from_api_client(api: ApiClient) -> Self {
        Self::assemble(Arc::new(api), WaitOptions::default())
    }

    fn assemble(api: Arc<ApiClient>, wait: WaitOptions) -> Self {
        Self {
            address: ResourceService::new(Arc::clone(&api)),
            address_group: ResourceService::new(Arc::clone(&api)),
            tag: ResourceService::new(Arc::clone(&api)),
            service: ResourceService::new(Arc::clone(&api)),
            service_group: ResourceService::new(Arc::clone(&api)),
            application: ResourceService::new(Arc::clone(&api)),
            application_group: ResourceService::new(Arc::clone(&api)),
            external_dynamic_list: ResourceService::new(Arc::clone(&api)),
            log_forwarding_profile: ResourceService::new(Arc::clone(&api)),
            schedule: ResourceService::new(Arc::clone(&api)),
            region: ResourceService::new(Arc::clone(&api)),
            hip_object: ResourceService::new(Arc::clone(&api)),
            hip_profile: ResourceService::new(Arc::clone(&api)),
            operations: OperationsService::new(Arc::clone(&api), wait),
            api,
            tsg_id: None,
        }
    }

    /// The underlying transport client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Tenant service group, when built from a [`ClientConfig`].
    pub fn tsg_id(&self) -> Option<&str> {
        self.tsg_id.as_deref()
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
