// ── Host information profile objects and profiles ──
//
// HIP criteria blocks are deeply nested and vendor-extensible, so they are
// carried as raw JSON. Only their presence is modelled.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::common::{NAME_MAX_LEN, require_non_empty, validate_description, validate_name};
use crate::container::ContainerFields;
use crate::error::CoreError;
use crate::filter::{AttributeFilter, NoFilter, match_any};
use crate::resource::{Validate, impl_resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HipCriteria {
    HostInfo,
    NetworkInfo,
    PatchManagement,
    DiskEncryption,
    MobileDevice,
    Certificate,
}

/// The optional criteria blocks of a HIP object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HipCriteriaBlocks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_management: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_encryption: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_device: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Value>,
}

impl HipCriteriaBlocks {
    /// Criteria types present on this object, in wire order.
    pub fn present(&self) -> Vec<HipCriteria> {
        [
            (HipCriteria::HostInfo, &self.host_info),
            (HipCriteria::NetworkInfo, &self.network_info),
            (HipCriteria::PatchManagement, &self.patch_management),
            (HipCriteria::DiskEncryption, &self.disk_encryption),
            (HipCriteria::MobileDevice, &self.mobile_device),
            (HipCriteria::Certificate, &self.certificate),
        ]
        .into_iter()
        .filter_map(|(kind, block)| block.as_ref().map(|_| kind))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HipObject {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub criteria: HipCriteriaBlocks,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HipObjectCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub criteria: HipCriteriaBlocks,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for HipObjectCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, NAME_MAX_LEN)?;
        validate_description(self.description.as_deref())?;
        if self.criteria.present().is_empty() {
            return Err(CoreError::validation(
                "HIP object needs at least one criteria block",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HipObjectFilter {
    /// Keep objects carrying any of these criteria blocks.
    pub criteria_types: Option<Vec<HipCriteria>>,
}

impl AttributeFilter<HipObject> for HipObjectFilter {
    fn matches(&self, record: &HipObject) -> bool {
        match_any(self.criteria_types.as_deref(), &record.criteria.present())
    }
}

impl_resource!(
    HipObject,
    create = HipObjectCreate,
    filter = HipObjectFilter,
    kind = HipObject,
    default_limit = 2500
);

// ── HIP profiles ─────────────────────────────────────────────────────

pub const HIP_MATCH_MAX_LEN: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HipProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Boolean expression over HIP objects, e.g. `"is-win" and "av-on"`.
    #[serde(rename = "match")]
    pub match_expr: String,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HipProfileCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "match")]
    pub match_expr: String,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for HipProfileCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, NAME_MAX_LEN)?;
        validate_description(self.description.as_deref())?;
        require_non_empty("match", &self.match_expr)?;
        if self.match_expr.chars().count() > HIP_MATCH_MAX_LEN {
            return Err(CoreError::validation(format!(
                "match expression exceeds {HIP_MATCH_MAX_LEN} characters"
            )));
        }
        Ok(())
    }
}

impl_resource!(
    HipProfile,
    create = HipProfileCreate,
    filter = NoFilter,
    kind = HipProfile,
    default_limit = 2500
);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::container::Container;

    #[test]
    fn criteria_presence_drives_filter() {
        let object: HipObject = serde_json::from_value(json!({
            "id": "123e4567-e89b-12d3-a456-426655440000",
            "name": "managed-laptop",
            "host_info": { "criteria": { "managed": true } },
            "disk_encryption": { "criteria": { "is_installed": true } },
            "folder": "Mobile Users"
        }))
        .expect("decodes");
        assert_eq!(
            object.criteria.present(),
            [HipCriteria::HostInfo, HipCriteria::DiskEncryption]
        );

        let mobile = HipObjectFilter {
            criteria_types: Some(vec![HipCriteria::MobileDevice]),
        };
        assert!(!mobile.matches(&object));
    }

    #[test]
    fn object_without_criteria_is_rejected() {
        let create = HipObjectCreate {
            name: "empty".into(),
            description: None,
            criteria: HipCriteriaBlocks::default(),
            container: Container::folder("Mobile Users").into(),
        };
        assert!(create.validate().is_err());
    }

    #[test]
    fn profile_match_is_renamed_on_the_wire() {
        let create = HipProfileCreate {
            name: "compliant".into(),
            description: None,
            match_expr: "\"managed-laptop\"".into(),
            container: Container::folder("Mobile Users").into(),
        };
        let wire = serde_json::to_value(&create).expect("serializes");
        assert_eq!(wire["match"], json!("\"managed-laptop\""));
        assert!(create.validate().is_ok());
    }
}
