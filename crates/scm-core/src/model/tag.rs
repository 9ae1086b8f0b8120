// ── Tags ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{TAG_MAX_LEN, validate_tag_name};
use crate::container::ContainerFields;
use crate::error::CoreError;
use crate::filter::{AttributeFilter, match_one};
use crate::resource::{Validate, impl_resource};

/// The fixed tag color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagColor {
    Red,
    Green,
    Blue,
    Yellow,
    Copper,
    Orange,
    Purple,
    Gray,
    #[serde(rename = "Light Green")]
    LightGreen,
    Cyan,
    #[serde(rename = "Light Gray")]
    LightGray,
    #[serde(rename = "Blue Gray")]
    BlueGray,
    Lime,
    Black,
    Gold,
    Brown,
    Olive,
    Maroon,
    #[serde(rename = "Red-Orange")]
    RedOrange,
    #[serde(rename = "Yellow-Orange")]
    YellowOrange,
    #[serde(rename = "Forest Green")]
    ForestGreen,
    #[serde(rename = "Turquoise Blue")]
    TurquoiseBlue,
    #[serde(rename = "Azure Blue")]
    AzureBlue,
    #[serde(rename = "Cerulean Blue")]
    CeruleanBlue,
    #[serde(rename = "Midnight Blue")]
    MidnightBlue,
    #[serde(rename = "Medium Blue")]
    MediumBlue,
    #[serde(rename = "Cobalt Blue")]
    CobaltBlue,
    #[serde(rename = "Violet Blue")]
    VioletBlue,
    #[serde(rename = "Blue Violet")]
    BlueViolet,
    #[serde(rename = "Medium Violet")]
    MediumViolet,
    #[serde(rename = "Medium Rose")]
    MediumRose,
    Lavender,
    Orchid,
    Thistle,
    Peach,
    Salmon,
    Magenta,
    #[serde(rename = "Red Violet")]
    RedViolet,
    Mahogany,
    #[serde(rename = "Burnt Sienna")]
    BurntSienna,
    Chestnut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TagColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(flatten)]
    pub container: ContainerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TagColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(flatten)]
    pub container: ContainerFields,
}

impl Validate for TagCreate {
    fn validate(&self) -> Result<(), CoreError> {
        self.container.container()?;
        validate_tag_name(&self.name, TAG_MAX_LEN)?;
        if self.comments.as_deref().is_some_and(|c| c.chars().count() > 1023) {
            return Err(CoreError::validation("comments exceed 1023 characters"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub colors: Option<Vec<TagColor>>,
}

impl AttributeFilter<Tag> for TagFilter {
    fn matches(&self, record: &Tag) -> bool {
        match_one(self.colors.as_deref(), record.color.as_ref())
    }
}

impl_resource!(Tag, create = TagCreate, filter = TagFilter, kind = Tag, default_limit = 2500);
