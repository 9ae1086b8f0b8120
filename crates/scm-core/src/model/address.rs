// ── Address objects ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{NAME_MAX_LEN, validate_description, validate_name, validate_tags};
use crate::container::ContainerFields;
use crate::error::CoreError;
use crate::filter::{AttributeFilter, match_any, match_one};
use crate::resource::{Validate, impl_resource};

/// The single value an address object carries.
///
/// On the wire this is one of four mutually exclusive keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressValue {
    /// `192.168.1.0/24`
    IpNetmask(String),
    /// `10.0.0.1-10.0.0.20`
    IpRange(String),
    /// `10.20.1.0/0.0.248.255`
    IpWildcard(String),
    /// `example.com`
    Fqdn(String),
}

/// Discriminant of [`AddressValue`], for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    Netmask,
    Range,
    Wildcard,
    Fqdn,
}

impl AddressValue {
    pub fn address_type(&self) -> AddressType {
        match self {
            Self::IpNetmask(_) => AddressType::Netmask,
            Self::IpRange(_) => AddressType::Range,
            Self::IpWildcard(_) => AddressType::Wildcard,
            Self::Fqdn(_) => AddressType::Fqdn,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::IpNetmask(v) | Self::IpRange(v) | Self::IpWildcard(v) | Self::Fqdn(v) => v,
        }
    }
}

/// Address object as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,
    #[serde(flatten)]
    pub value: AddressValue,
    #[serde(flatten)]
    pub container: ContainerFields,
}

/// Payload for creating an address object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,
    #[serde(flatten)]
    pub value: AddressValue,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl AddressCreate {
    pub fn new(
        name: impl Into<String>,
        value: AddressValue,
        container: crate::container::Container,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            tag: Vec::new(),
            value,
            container: container.into(),
        }
    }
}

impl Validate for AddressCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, NAME_MAX_LEN)?;
        validate_description(self.description.as_deref())?;
        validate_tags(&self.tag)?;
        if self.value.as_str().trim().is_empty() {
            return Err(CoreError::validation("address value cannot be empty"));
        }
        Ok(())
    }
}

/// Post-fetch filters for address listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFilter {
    pub types: Option<Vec<AddressType>>,
    /// Keep addresses whose value is one of these strings.
    pub values: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl AttributeFilter<Address> for AddressFilter {
    fn matches(&self, record: &Address) -> bool {
        match_one(self.types.as_deref(), Some(&record.value.address_type()))
            && self
                .values
                .as_deref()
                .is_none_or(|values| values.iter().any(|v| v == record.value.as_str()))
            && match_any(self.tags.as_deref(), &record.tag)
    }
}

impl_resource!(Address, create = AddressCreate, filter = AddressFilter, kind = Address, default_limit = 2500);
