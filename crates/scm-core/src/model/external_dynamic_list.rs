// ── External dynamic lists ──
//
// An EDL points the firewall at a remote list of IPs, domains, URLs, or
// subscriber identifiers, refreshed on a schedule.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{NAME_MAX_LEN, require_non_empty, validate_description, validate_name};
use crate::container::ContainerFields;
use crate::error::CoreError;
use crate::filter::{AttributeFilter, match_one};
use crate::resource::{Validate, impl_resource};

/// Refresh schedule for a remote list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshSchedule {
    FiveMinute {},
    Hourly {},
    Daily { at: String },
    Weekly { day_of_week: String, at: String },
    Monthly { day_of_month: u8, at: String },
}

impl RefreshSchedule {
    fn validate(&self) -> Result<(), CoreError> {
        const DAYS: &[&str] = &[
            "sunday",
            "monday",
            "tuesday",
            "wednesday",
            "thursday",
            "friday",
            "saturday",
        ];
        let check_hour = |at: &str| match at.parse::<u8>() {
            Ok(h) if h < 24 && at.len() == 2 => Ok(()),
            _ => Err(CoreError::validation(format!(
                "refresh hour '{at}' must be two digits 00-23"
            ))),
        };
        match self {
            Self::FiveMinute {} | Self::Hourly {} => Ok(()),
            Self::Daily { at } => check_hour(at),
            Self::Weekly { day_of_week, at } => {
                if !DAYS.contains(&day_of_week.as_str()) {
                    return Err(CoreError::validation(format!(
                        "invalid day_of_week '{day_of_week}'"
                    )));
                }
                check_hour(at)
            }
            Self::Monthly { day_of_month, at } => {
                if !(1..=31).contains(day_of_month) {
                    return Err(CoreError::validation("day_of_month must be 1-31"));
                }
                check_hour(at)
            }
        }
    }
}

/// Basic-auth credentials for fetching a protected list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdlAuth {
    pub username: String,
    pub password: String,
}

/// Remote list source shared by the ip / url / imsi / imei variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdlSource {
    pub url: String,
    pub recurring: RefreshSchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exception_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<EdlAuth>,
}

impl EdlSource {
    pub fn new(url: impl Into<String>, recurring: RefreshSchedule) -> Self {
        Self {
            url: url.into(),
            recurring,
            description: None,
            exception_list: Vec::new(),
            certificate_profile: None,
            auth: None,
        }
    }
}

/// Domain lists additionally allow wildcard subdomain expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSource {
    #[serde(flatten)]
    pub source: EdlSource,
    #[serde(default)]
    pub expand_domain: bool,
}

/// Palo Alto Networks-maintained lists; no schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredefinedSource {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exception_list: Vec<String>,
}

/// The list type, serialized as `{"type": {"ip": {...}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdlType {
    Ip(EdlSource),
    Domain(DomainSource),
    Url(EdlSource),
    Imsi(EdlSource),
    Imei(EdlSource),
    PredefinedIp(PredefinedSource),
    PredefinedUrl(PredefinedSource),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdlKind {
    Ip,
    Domain,
    Url,
    Imsi,
    Imei,
    PredefinedIp,
    PredefinedUrl,
}

impl EdlType {
    pub fn kind(&self) -> EdlKind {
        match self {
            Self::Ip(_) => EdlKind::Ip,
            Self::Domain(_) => EdlKind::Domain,
            Self::Url(_) => EdlKind::Url,
            Self::Imsi(_) => EdlKind::Imsi,
            Self::Imei(_) => EdlKind::Imei,
            Self::PredefinedIp(_) => EdlKind::PredefinedIp,
            Self::PredefinedUrl(_) => EdlKind::PredefinedUrl,
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        let source = match self {
            Self::Ip(s) | Self::Url(s) | Self::Imsi(s) | Self::Imei(s) => s,
            Self::Domain(d) => &d.source,
            Self::PredefinedIp(p) | Self::PredefinedUrl(p) => {
                return require_non_empty("url", &p.url);
            }
        };
        require_non_empty("url", &source.url)?;
        validate_description(source.description.as_deref())?;
        source.recurring.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDynamicList {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub list_type: EdlType,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDynamicListCreate {
    pub name: String,
    #[serde(rename = "type")]
    pub list_type: EdlType,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for ExternalDynamicListCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, NAME_MAX_LEN)?;
        self.list_type.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalDynamicListFilter {
    pub types: Option<Vec<EdlKind>>,
}

impl AttributeFilter<ExternalDynamicList> for ExternalDynamicListFilter {
    fn matches(&self, record: &ExternalDynamicList) -> bool {
        match_one(self.types.as_deref(), Some(&record.list_type.kind()))
    }
}

impl_resource!(
    ExternalDynamicList,
    create = ExternalDynamicListCreate,
    filter = ExternalDynamicListFilter,
    kind = ExternalDynamicList,
    default_limit = 2500
);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::container::Container;

    #[test]
    fn edl_type_round_trips_nested_schedule() {
        let edl: ExternalDynamicList = serde_json::from_value(json!({
            "id": "123e4567-e89b-12d3-a456-426655440000",
            "name": "blocklist",
            "type": {
                "ip": {
                    "url": "https://lists.example.com/ips.txt",
                    "recurring": { "daily": { "at": "03" } }
                }
            },
            "folder": "Texas"
        }))
        .expect("decodes");
        assert_eq!(edl.list_type.kind(), EdlKind::Ip);

        let wire = serde_json::to_value(&edl).expect("serializes");
        assert_eq!(wire["type"]["ip"]["recurring"], json!({ "daily": { "at": "03" } }));
    }

    #[test]
    fn five_minute_schedule_is_an_empty_object() {
        let wire = serde_json::to_value(RefreshSchedule::FiveMinute {}).expect("serializes");
        assert_eq!(wire, json!({ "five_minute": {} }));
    }

    #[test]
    fn bad_refresh_hour_is_rejected() {
        let create = ExternalDynamicListCreate {
            name: "blocklist".into(),
            list_type: EdlType::Url(EdlSource::new(
                "https://lists.example.com/urls.txt",
                RefreshSchedule::Weekly {
                    day_of_week: "monday".into(),
                    at: "25".into(),
                },
            )),
            container: Container::folder("Texas").into(),
        };
        assert!(create.validate().is_err());
    }
}
