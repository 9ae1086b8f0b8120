// ── Resource contract ──
//
// Every configuration object type implements `Resource`, which ties its
// response model to its create payload, its typed list filter, its endpoint,
// and its paging defaults. `ResourceService<R>` is written once against this
// trait.

use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::{AsRefStr, Display, EnumIter};
use uuid::Uuid;

use crate::container::ContainerFields;
use crate::error::CoreError;
use crate::filter::AttributeFilter;

/// Server-enforced maximum page size for configuration endpoints.
pub const SERVER_MAX_LIMIT: u32 = 5000;

/// Tag for each supported resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum ResourceKind {
    Address,
    AddressGroup,
    Tag,
    Service,
    ServiceGroup,
    Application,
    ApplicationGroup,
    ExternalDynamicList,
    LogForwardingProfile,
    Schedule,
    Region,
    HipObject,
    HipProfile,
}

impl ResourceKind {
    /// Collection endpoint, relative to the API base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Address => "/config/objects/v1/addresses",
            Self::AddressGroup => "/config/objects/v1/address-groups",
            Self::Tag => "/config/objects/v1/tags",
            Self::Service => "/config/objects/v1/services",
            Self::ServiceGroup => "/config/objects/v1/service-groups",
            Self::Application => "/config/objects/v1/applications",
            Self::ApplicationGroup => "/config/objects/v1/application-groups",
            Self::ExternalDynamicList => "/config/objects/v1/external-dynamic-lists",
            Self::LogForwardingProfile => "/config/objects/v1/log-forwarding-profiles",
            Self::Schedule => "/config/objects/v1/schedules",
            Self::Region => "/config/objects/v1/regions",
            Self::HipObject => "/config/objects/v1/hip-objects",
            Self::HipProfile => "/config/objects/v1/hip-profiles",
        }
    }
}

/// Anything that lives in a folder, snippet, or device.
pub trait Contained {
    fn container_fields(&self) -> &ContainerFields;
}

/// Client-side validation run before a payload is sent.
pub trait Validate {
    fn validate(&self) -> Result<(), CoreError>;
}

/// A configuration object type exposed by the API.
pub trait Resource: Contained + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Payload accepted by `create()`.
    type Create: Serialize + Validate + Send + Sync;
    /// Typed post-fetch attribute filter for `list()`.
    type Filter: AttributeFilter<Self> + Default + Send + Sync;

    const KIND: ResourceKind;
    /// Page size used when the caller does not pass `max_limit`.
    const DEFAULT_MAX_LIMIT: u32;
    /// Largest page size the server accepts; larger requests are clamped.
    const MAX_LIMIT: u32 = SERVER_MAX_LIMIT;

    fn id(&self) -> &Uuid;
    fn name(&self) -> &str;
}

/// Implements `Contained` and `Resource` for a model with the standard
/// `id` / `name` / `container` fields.
macro_rules! impl_resource {
    ($model:ty, create = $create:ty, filter = $filter:ty, kind = $kind:ident, default_limit = $limit:expr) => {
        impl $crate::resource::Contained for $model {
            fn container_fields(&self) -> &$crate::container::ContainerFields {
                &self.container
            }
        }

        impl $crate::resource::Resource for $model {
            type Create = $create;
            type Filter = $filter;

            const KIND: $crate::resource::ResourceKind = $crate::resource::ResourceKind::$kind;
            const DEFAULT_MAX_LIMIT: u32 = $limit;

            fn id(&self) -> &::uuid::Uuid {
                &self.id
            }

            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

pub(crate) use impl_resource;
