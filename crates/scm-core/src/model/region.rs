// ── Regions ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::validate_name;
use crate::container::ContainerFields;
use crate::error::CoreError;
use crate::filter::{AttributeFilter, match_any};
use crate::resource::{Validate, impl_resource};

pub const REGION_NAME_MAX_LEN: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    fn validate(self) -> Result<(), CoreError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::validation(format!(
                "latitude {} is outside -90..=90",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::validation(format!(
                "longitude {} is outside -180..=180",
                self.longitude
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_location: Option<GeoLocation>,
    /// Member networks: IPs, ranges, or subnets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<String>,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_location: Option<GeoLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<String>,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for RegionCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_name(&self.name, REGION_NAME_MAX_LEN)?;
        if let Some(geo) = self.geo_location {
            geo.validate()?;
        }
        if self.address.iter().any(|a| a.trim().is_empty()) {
            return Err(CoreError::validation("address cannot contain blank entries"));
        }
        Ok(())
    }
}

/// Inclusive bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl GeoBounds {
    pub fn contains(&self, geo: GeoLocation) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&geo.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&geo.longitude)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionFilter {
    /// Keep regions whose location falls inside the box. Regions without a
    /// location never match.
    pub geo_location: Option<GeoBounds>,
    pub addresses: Option<Vec<String>>,
}

impl AttributeFilter<Region> for RegionFilter {
    fn matches(&self, record: &Region) -> bool {
        let geo_ok = match self.geo_location {
            None => true,
            Some(bounds) => record.geo_location.is_some_and(|g| bounds.contains(g)),
        };
        geo_ok && match_any(self.addresses.as_deref(), &record.address)
    }

    fn validate(&self) -> Result<(), CoreError> {
        match self.geo_location {
            Some(b) if b.min_latitude > b.max_latitude || b.min_longitude > b.max_longitude => Err(
                CoreError::validation("geo_location bounds have min greater than max"),
            ),
            _ => Ok(()),
        }
    }
}

impl_resource!(
    Region,
    create = RegionCreate,
    filter = RegionFilter,
    kind = Region,
    default_limit = 2500
);
