//! Serde mirror of the state XML layout
//!
//! Fields stay as raw strings here; token validation happens in the loader
//! so that every failure can be reported as a schema error.

use serde::Deserialize;

pub const ROOT_ELEMENT: &str = "state";
pub const BEFORE_BATTLE: &str = "before_battle";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateDocument {
    #[serde(rename = "@type", default)]
    pub state_type: Option<String>,
    pub map: MapElement,
    pub subjects: SubjectsElement,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapElement {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubjectsElement {
    #[serde(rename = "subject", default)]
    pub subjects: Vec<SubjectElement>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubjectElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub position: String,
    pub direction: String,
    pub combat_mode: String,
    #[serde(default)]
    pub properties: PropertiesElement,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertiesElement {
    #[serde(rename = "item", default)]
    pub items: Vec<ItemElement>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemElement {
    pub key: String,
    pub value: String,
}
