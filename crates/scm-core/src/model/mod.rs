// ── Configuration object models ──
//
// Each resource has a response model (carries `id`), a create payload
// (no `id`, validated before sending), and a typed list filter. Mutually
// exclusive wire fields are sum types; the container is flattened into
// `folder` / `snippet` / `device`.

pub mod common;

pub mod address;
pub mod address_group;
pub mod application;
pub mod external_dynamic_list;
pub mod hip;
pub mod log_forwarding;
pub mod region;
pub mod schedule;
pub mod service;
pub mod tag;

// ── Re-exports ──────────────────────────────────────────────────────

pub use common::{DESCRIPTION_MAX_LEN, NAME_MAX_LEN, TAG_MAX_LEN};

// Addresses
pub use address::{Address, AddressCreate, AddressFilter, AddressType, AddressValue};
pub use address_group::{
    AddressGroup, AddressGroupCreate, AddressGroupFilter, AddressGroupMembers, DynamicFilter,
    GroupType,
};

// Tags
pub use tag::{Tag, TagColor, TagCreate, TagFilter};

// Services
pub use service::{
    PortSpec, Protocol, ProtocolOverride, Service, ServiceCreate, ServiceFilter, ServiceGroup,
    ServiceGroupCreate, ServiceGroupFilter, ServiceProtocol,
};

// Applications
pub use application::{
    Application, ApplicationCreate, ApplicationFilter, ApplicationGroup, ApplicationGroupCreate,
    ApplicationGroupFilter, ApplicationGroupMembers, ApplicationTraits,
};

// External dynamic lists
pub use external_dynamic_list::{
    DomainSource, EdlAuth, EdlKind, EdlSource, EdlType, ExternalDynamicList,
    ExternalDynamicListCreate, ExternalDynamicListFilter, PredefinedSource, RefreshSchedule,
};

// Log forwarding
pub use log_forwarding::{
    LogForwardingProfile, LogForwardingProfileCreate, LogForwardingProfileFilter, LogType,
    MatchListItem,
};

// Schedules
pub use schedule::{
    Recurring, Schedule, ScheduleCreate, ScheduleFilter, ScheduleKind, ScheduleType,
    WeeklySchedule,
};

// Regions
pub use region::{GeoBounds, GeoLocation, Region, RegionCreate, RegionFilter};

// HIP
pub use hip::{
    HipCriteria, HipCriteriaBlocks, HipObject, HipObjectCreate, HipObjectFilter, HipProfile,
    HipProfileCreate,
};
