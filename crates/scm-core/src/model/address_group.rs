// ── Address groups ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{
    NAME_MAX_LEN, require_non_empty, validate_description, validate_members, validate_name,
    validate_tags,
};
use crate::container::ContainerFields;
use crate::error::CoreError;
use crate::filter::{AttributeFilter, match_any, match_one};
use crate::resource::{Validate, impl_resource};

/// Tag-expression membership, e.g. `'web' and 'prod'`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicFilter {
    pub filter: String,
}

/// Group membership: a static member list or a dynamic tag filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressGroupMembers {
    Static(Vec<String>),
    Dynamic(DynamicFilter),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupType {
    Static,
    Dynamic,
}

impl AddressGroupMembers {
    pub fn group_type(&self) -> GroupType {
        match self {
            Self::Static(_) => GroupType::Static,
            Self::Dynamic(_) => GroupType::Dynamic,
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Static(members) => validate_members("static members", members),
            Self::Dynamic(d) => {
                require_non_empty("dynamic filter", &d.filter)?;
                if d.filter.chars().count() > 1024 {
                    return Err(CoreError::validation(
                        "dynamic filter exceeds 1024 characters",
                    ));
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressGroup {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,
    #[serde(flatten)]
    pub members: AddressGroupMembers,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressGroupCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,
    #[serde(flatten)]
    pub members: AddressGroupMembers,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for AddressGroupCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, NAME_MAX_LEN)?;
        validate_description(self.description.as_deref())?;
        validate_tags(&self.tag)?;
        self.members.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressGroupFilter {
    pub types: Option<Vec<GroupType>>,
    /// Keep static groups containing any of these members.
    pub values: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl AttributeFilter<AddressGroup> for AddressGroupFilter {
    fn matches(&self, record: &AddressGroup) -> bool {
        let static_members: &[String] = match &record.members {
            AddressGroupMembers::Static(m) => m,
            AddressGroupMembers::Dynamic(_) => &[],
        };
        match_one(self.types.as_deref(), Some(&record.members.group_type()))
            && match_any(self.values.as_deref(), static_members)
            && match_any(self.tags.as_deref(), &record.tag)
    }
}

impl_resource!(
    AddressGroup,
    create = AddressGroupCreate,
    filter = AddressGroupFilter,
    kind = AddressGroup,
    default_limit = 2500
);
