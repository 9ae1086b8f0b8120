// ── Custom applications and application groups ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{
    NAME_MAX_LEN, require_non_empty, validate_description, validate_members, validate_name,
};
use crate::container::ContainerFields;
use crate::error::CoreError;
use crate::filter::{AttributeFilter, match_any, match_one};
use crate::resource::{Validate, impl_resource};

/// Behavioural characteristics of an application; all default to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ApplicationTraits {
    #[serde(default)]
    pub evasive: bool,
    #[serde(default)]
    pub pervasive: bool,
    #[serde(default)]
    pub excessive_bandwidth_use: bool,
    #[serde(default)]
    pub used_by_malware: bool,
    #[serde(default)]
    pub transfers_files: bool,
    #[serde(default)]
    pub has_known_vulnerabilities: bool,
    #[serde(default)]
    pub tunnels_other_apps: bool,
    #[serde(default)]
    pub prone_to_misuse: bool,
    #[serde(default)]
    pub no_certifications: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub technology: String,
    /// 1 (lowest) to 5 (highest).
    pub risk: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(flatten)]
    pub traits: ApplicationTraits,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationCreate {
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub technology: String,
    pub risk: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(flatten)]
    pub traits: ApplicationTraits,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for ApplicationCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, NAME_MAX_LEN)?;
        validate_description(self.description.as_deref())?;
        require_non_empty("category", &self.category)?;
        require_non_empty("subcategory", &self.subcategory)?;
        require_non_empty("technology", &self.technology)?;
        if !(1..=5).contains(&self.risk) {
            return Err(CoreError::validation(format!(
                "risk must be between 1 and 5, got {}",
                self.risk
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub category: Option<Vec<String>>,
    pub subcategory: Option<Vec<String>>,
    pub technology: Option<Vec<String>>,
    pub risk: Option<Vec<u8>>,
}

impl AttributeFilter<Application> for ApplicationFilter {
    fn matches(&self, record: &Application) -> bool {
        match_one(self.category.as_deref(), Some(&record.category))
            && match_one(self.subcategory.as_deref(), Some(&record.subcategory))
            && match_one(self.technology.as_deref(), Some(&record.technology))
            && match_one(self.risk.as_deref(), Some(&record.risk))
    }

    fn validate(&self) -> Result<(), CoreError> {
        match &self.risk {
            Some(levels) if levels.iter().any(|r| !(1..=5).contains(r)) => Err(
                CoreError::validation("risk filter values must be between 1 and 5"),
            ),
            _ => Ok(()),
        }
    }
}

impl_resource!(
    Application,
    create = ApplicationCreate,
    filter = ApplicationFilter,
    kind = Application,
    default_limit = 200
);

// ── Application groups ───────────────────────────────────────────────

/// `{"members": [...]}` or `{"dynamic": {"filter": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationGroupMembers {
    Members(Vec<String>),
    Dynamic(super::address_group::DynamicFilter),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationGroup {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub members: ApplicationGroupMembers,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationGroupCreate {
    pub name: String,
    #[serde(flatten)]
    pub members: ApplicationGroupMembers,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for ApplicationGroupCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, NAME_MAX_LEN)?;
        match &self.members {
            ApplicationGroupMembers::Members(m) => validate_members("members", m),
            ApplicationGroupMembers::Dynamic(d) => require_non_empty("dynamic filter", &d.filter),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationGroupFilter {
    /// Keep groups listing any of these applications.
    pub members: Option<Vec<String>>,
}

impl AttributeFilter<ApplicationGroup> for ApplicationGroupFilter {
    fn matches(&self, record: &ApplicationGroup) -> bool {
        let members: &[String] = match &record.members {
            ApplicationGroupMembers::Members(m) => m,
            ApplicationGroupMembers::Dynamic(_) => &[],
        };
        match_any(self.members.as_deref(), members)
    }
}

impl_resource!(
    ApplicationGroup,
    create = ApplicationGroupCreate,
    filter = ApplicationGroupFilter,
    kind = ApplicationGroup,
    default_limit = 2500
);
