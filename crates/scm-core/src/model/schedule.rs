// ── Schedules ──
//
// Time windows are `HH:MM-HH:MM` (recurring) or
// `YYYY/MM/DD@HH:MM-YYYY/MM/DD@HH:MM` (non-recurring).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::validate_name;
use crate::container::ContainerFields;
use crate::error::CoreError;
use crate::filter::{AttributeFilter, match_one};
use crate::resource::{Validate, impl_resource};

pub const SCHEDULE_NAME_MAX_LEN: usize = 31;

/// Per-day time ranges; days without ranges are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sunday: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monday: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tuesday: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wednesday: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thursday: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub friday: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub saturday: Vec<String>,
}

impl WeeklySchedule {
    fn ranges(&self) -> impl Iterator<Item = &String> {
        [
            &self.sunday,
            &self.monday,
            &self.tuesday,
            &self.wednesday,
            &self.thursday,
            &self.friday,
            &self.saturday,
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurring {
    Weekly(WeeklySchedule),
    Daily(Vec<String>),
}

/// `{"recurring": {...}}` or `{"non_recurring": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Recurring(Recurring),
    NonRecurring(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleKind {
    Weekly,
    Daily,
    NonRecurring,
}

impl ScheduleType {
    pub fn kind(&self) -> ScheduleKind {
        match self {
            Self::Recurring(Recurring::Weekly(_)) => ScheduleKind::Weekly,
            Self::Recurring(Recurring::Daily(_)) => ScheduleKind::Daily,
            Self::NonRecurring(_) => ScheduleKind::NonRecurring,
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Recurring(Recurring::Weekly(w)) => {
                let mut any = false;
                for range in w.ranges() {
                    any = true;
                    validate_time_range(range)?;
                }
                if !any {
                    return Err(CoreError::validation(
                        "weekly schedule needs at least one time range",
                    ));
                }
                Ok(())
            }
            Self::Recurring(Recurring::Daily(ranges)) => {
                if ranges.is_empty() {
                    return Err(CoreError::validation(
                        "daily schedule needs at least one time range",
                    ));
                }
                ranges.iter().try_for_each(|r| validate_time_range(r))
            }
            Self::NonRecurring(ranges) => {
                if ranges.is_empty() {
                    return Err(CoreError::validation(
                        "non-recurring schedule needs at least one date range",
                    ));
                }
                ranges.iter().try_for_each(|r| validate_date_range(r))
            }
        }
    }
}

fn is_clock(s: &str) -> bool {
    let Some((h, m)) = s.split_once(':') else {
        return false;
    };
    h.len() == 2
        && m.len() == 2
        && h.parse::<u8>().is_ok_and(|h| h < 24)
        && m.parse::<u8>().is_ok_and(|m| m < 60)
}

fn is_date(s: &str) -> bool {
    let parts: Vec<&str> = s.split('/').collect();
    matches!(parts.as_slice(), [y, m, d]
        if y.len() == 4
            && y.parse::<u16>().is_ok()
            && m.len() == 2
            && m.parse::<u8>().is_ok_and(|m| (1..=12).contains(&m))
            && d.len() == 2
            && d.parse::<u8>().is_ok_and(|d| (1..=31).contains(&d)))
}

fn validate_time_range(range: &str) -> Result<(), CoreError> {
    match range.split_once('-') {
        Some((start, end)) if is_clock(start) && is_clock(end) => Ok(()),
        _ => Err(CoreError::validation(format!(
            "time range '{range}' must be HH:MM-HH:MM"
        ))),
    }
}

fn validate_date_range(range: &str) -> Result<(), CoreError> {
    let endpoint_ok = |s: &str| {
        s.split_once('@')
            .is_some_and(|(date, time)| is_date(date) && is_clock(time))
    };
    match range.split_once('-') {
        Some((start, end)) if endpoint_ok(start) && endpoint_ok(end) => Ok(()),
        _ => Err(CoreError::validation(format!(
            "date range '{range}' must be YYYY/MM/DD@HH:MM-YYYY/MM/DD@HH:MM"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub name: String,
    pub schedule_type: ScheduleType,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCreate {
    pub name: String,
    pub schedule_type: ScheduleType,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for ScheduleCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, SCHEDULE_NAME_MAX_LEN)?;
        self.schedule_type.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleFilter {
    pub schedule_type: Option<Vec<ScheduleKind>>,
}

impl AttributeFilter<Schedule> for ScheduleFilter {
    fn matches(&self, record: &Schedule) -> bool {
        match_one(self.schedule_type.as_deref(), Some(&record.schedule_type.kind()))
    }
}

impl_resource!(
    Schedule,
    create = ScheduleCreate,
    filter = ScheduleFilter,
    kind = Schedule,
    default_limit = 200
);
