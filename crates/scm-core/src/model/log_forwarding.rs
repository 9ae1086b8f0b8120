// ── Log forwarding profiles ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{NAME_MAX_LEN, validate_description, validate_name};
use crate::container::ContainerFields;
use crate::error::CoreError;
use crate::filter::{AttributeFilter, match_any};
use crate::resource::{Validate, impl_resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogType {
    Traffic,
    Threat,
    Wildfire,
    Url,
    Data,
    Tunnel,
    Auth,
    Decryption,
    DnsSecurity,
}

/// One rule of a profile: which logs to match and where to send them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchListItem {
    pub name: String,
    pub log_type: LogType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_desc: Option<String>,
    /// Log query, e.g. `(addr.src in 10.0.0.0/8)`; `All Logs` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub send_http: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub send_syslog: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub send_to_panorama: Vec<String>,
    #[serde(default)]
    pub quarantine: bool,
}

impl MatchListItem {
    pub fn new(name: impl Into<String>, log_type: LogType) -> Self {
        Self {
            name: name.into(),
            log_type,
            action_desc: None,
            filter: None,
            send_http: Vec::new(),
            send_syslog: Vec::new(),
            send_to_panorama: Vec::new(),
            quarantine: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogForwardingProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_list: Vec<MatchListItem>,
    #[serde(default)]
    pub enhanced_application_logging: bool,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogForwardingProfileCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_list: Vec<MatchListItem>,
    #[serde(default)]
    pub enhanced_application_logging: bool,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for LogForwardingProfileCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, NAME_MAX_LEN)?;
        validate_description(self.description.as_deref())?;
        for (i, item) in self.match_list.iter().enumerate() {
            validate_name(&item.name, NAME_MAX_LEN)?;
            if self.match_list[..i].iter().any(|prev| prev.name == item.name) {
                return Err(CoreError::validation(format!(
                    "duplicate match list entry '{}'",
                    item.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogForwardingProfileFilter {
    /// Keep profiles with at least one rule for any of these log types.
    pub log_type: Option<Vec<LogType>>,
}

impl AttributeFilter<LogForwardingProfile> for LogForwardingProfileFilter {
    fn matches(&self, record: &LogForwardingProfile) -> bool {
        match_any(
            self.log_type.as_deref(),
            record.match_list.iter().map(|item| &item.log_type),
        )
    }
}

impl_resource!(
    LogForwardingProfile,
    create = LogForwardingProfileCreate,
    filter = LogForwardingProfileFilter,
    kind = LogForwardingProfile,
    default_limit = 2500
);
