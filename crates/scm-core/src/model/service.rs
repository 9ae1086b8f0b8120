// ── Service objects and service groups ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{
    NAME_MAX_LEN, validate_description, validate_members, validate_name, validate_tags,
};
use crate::container::ContainerFields;
use crate::error::CoreError;
use crate::filter::{AttributeFilter, match_any, match_one};
use crate::resource::{Validate, impl_resource};

/// Session timeout overrides for a TCP service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halfclose_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timewait_timeout: Option<u32>,
}

/// Destination (and optional source) ports, e.g. `"80,443,8000-8080"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub port: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ProtocolOverride>,
}

impl PortSpec {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            source_port: None,
            overrides: None,
        }
    }
}

/// `{"tcp": {...}}` or `{"udp": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceProtocol {
    Tcp(PortSpec),
    Udp(PortSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl ServiceProtocol {
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Tcp(_) => Protocol::Tcp,
            Self::Udp(_) => Protocol::Udp,
        }
    }

    pub fn ports(&self) -> &PortSpec {
        match self {
            Self::Tcp(p) | Self::Udp(p) => p,
        }
    }
}

/// Validate a port list: comma-separated ports or `lo-hi` ranges in 1..=65535.
fn validate_ports(field: &str, spec: &str) -> Result<(), CoreError> {
    let invalid = || CoreError::validation(format!("invalid {field} '{spec}'"));
    if spec.trim().is_empty() {
        return Err(CoreError::validation(format!("{field} cannot be empty")));
    }
    for part in spec.split(',').map(str::trim) {
        let (lo, hi) = part.split_once('-').unwrap_or((part, part));
        let lo: u16 = lo.trim().parse().map_err(|_| invalid())?;
        let hi: u16 = hi.trim().parse().map_err(|_| invalid())?;
        if lo == 0 || lo > hi {
            return Err(invalid());
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,
    pub protocol: ServiceProtocol,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,
    pub protocol: ServiceProtocol,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for ServiceCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, NAME_MAX_LEN)?;
        validate_description(self.description.as_deref())?;
        validate_tags(&self.tag)?;
        let ports = self.protocol.ports();
        validate_ports("port", &ports.port)?;
        if let Some(src) = ports.source_port.as_deref() {
            validate_ports("source_port", src)?;
        }
        if self.protocol.protocol() == Protocol::Udp && ports.overrides.is_some() {
            return Err(CoreError::validation(
                "timeout overrides are only supported for tcp services",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceFilter {
    pub protocols: Option<Vec<Protocol>>,
    pub tags: Option<Vec<String>>,
}

impl AttributeFilter<Service> for ServiceFilter {
    fn matches(&self, record: &Service) -> bool {
        match_one(self.protocols.as_deref(), Some(&record.protocol.protocol()))
            && match_any(self.tags.as_deref(), &record.tag)
    }
}

impl_resource!(Service, create = ServiceCreate, filter = ServiceFilter, kind = Service, default_limit = 2500);

// ── Service groups ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceGroupCreate {
    pub name: String,
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for ServiceGroupCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, NAME_MAX_LEN)?;
        validate_tags(&self.tag)?;
        validate_members("members", &self.members)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceGroupFilter {
    /// Keep groups containing any of these members.
    pub values: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl AttributeFilter<ServiceGroup> for ServiceGroupFilter {
    fn matches(&self, record: &ServiceGroup) -> bool {
        match_any(self.values.as_deref(), &record.members)
            && match_any(self.tags.as_deref(), &record.tag)
    }
}

impl_resource!(
    ServiceGroup,
    create = ServiceGroupCreate,
    filter = ServiceGroupFilter,
    kind = ServiceGroup,
    default_limit = 2500
);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::container::Container;

    fn create(protocol: ServiceProtocol) -> ServiceCreate {
        ServiceCreate {
            name: "web".into(),
            description: None,
            tag: Vec::new(),
            protocol,
            container: Container::folder("Texas").into(),
        }
    }

    #[test]
    fn protocol_serializes_as_nested_key() {
        let wire = serde_json::to_value(create(ServiceProtocol::Tcp(PortSpec::new("80,443"))))
            .expect("serializes");
        assert_eq!(wire["protocol"], json!({ "tcp": { "port": "80,443" } }));
    }

    #[test]
    fn port_lists_and_ranges_are_checked() {
        assert!(create(ServiceProtocol::Tcp(PortSpec::new("80,8000-8080"))).validate().is_ok());
        assert!(create(ServiceProtocol::Udp(PortSpec::new("53"))).validate().is_ok());
        assert!(create(ServiceProtocol::Tcp(PortSpec::new(""))).validate().is_err());
        assert!(create(ServiceProtocol::Tcp(PortSpec::new("9000-80"))).validate().is_err());
        assert!(create(ServiceProtocol::Tcp(PortSpec::new("70000"))).validate().is_err());
    }

    #[test]
    fn udp_rejects_tcp_overrides() {
        let mut ports = PortSpec::new("53");
        ports.overrides = Some(ProtocolOverride {
            timeout: Some(30),
            ..ProtocolOverride::default()
        });
        assert!(create(ServiceProtocol::Udp(ports)).validate().is_err());
    }
}
