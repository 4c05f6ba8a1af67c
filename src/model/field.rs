//! Custom fields and their value union
//!
//! Affinity attaches an open-ended set of typed fields to each entity. The
//! value is adjacently tagged on the wire (`{"type": ..., "data": ...}`);
//! here it is a closed union with one variant per kind, so dispatch in the
//! normalizer is an exhaustive match. New kinds are added by extending the
//! union, never by runtime type inspection.

use super::interaction::Interaction;
use super::EntityRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A custom or built-in field attached to an entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Opaque field id; a `field-` prefix marks user-defined custom fields
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Field-type category ("enriched", "global", "relationship-intelligence", "list")
    #[serde(default, rename = "type")]
    pub category: Option<String>,
    /// Enrichment provider, when the field is enriched
    #[serde(default)]
    pub enrichment_source: Option<String>,
    /// The typed value
    pub value: FieldValue,
}

impl Field {
    /// True when this is a user-defined custom field
    pub fn is_custom(&self) -> bool {
        self.id.starts_with("field-")
    }

    /// Output column name for this field's value
    ///
    /// Built-in fields use their id as-is; custom fields combine id and name
    /// so colliding display names stay distinct across entities.
    pub fn column_name(&self) -> String {
        if self.is_custom() {
            format!("{}_{}", self.id, self.name)
        } else {
            self.id.clone()
        }
    }
}

/// The tagged union of field value kinds
///
/// Tags are the Affinity wire names. Exactly one kind applies per field;
/// each carries a nullable `data` payload of the corresponding shape.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum FieldValue {
    #[serde(rename = "text")]
    Text(Option<String>),
    #[serde(rename = "filterable-text")]
    FilterableText(Option<String>),
    #[serde(rename = "filterable-text-multi")]
    FilterableTexts(Option<Vec<String>>),
    #[serde(rename = "number")]
    Number(Option<f64>),
    #[serde(rename = "number-multi")]
    Numbers(Option<Vec<f64>>),
    #[serde(rename = "datetime")]
    Datetime(Option<DateTime<Utc>>),
    #[serde(rename = "location")]
    Location(Option<Location>),
    #[serde(rename = "location-multi")]
    Locations(Option<Vec<Location>>),
    #[serde(rename = "dropdown")]
    Dropdown(Option<DropdownOption>),
    #[serde(rename = "ranked-dropdown")]
    RankedDropdown(Option<DropdownOption>),
    #[serde(rename = "dropdown-multi")]
    Dropdowns(Option<Vec<DropdownOption>>),
    #[serde(rename = "person")]
    Person(Option<EntityRef>),
    #[serde(rename = "person-multi")]
    Persons(Option<Vec<EntityRef>>),
    #[serde(rename = "company")]
    Company(Option<EntityRef>),
    #[serde(rename = "company-multi")]
    Companies(Option<Vec<EntityRef>>),
    #[serde(rename = "formula-number")]
    Formula(Option<FormulaNumber>),
    #[serde(rename = "interaction")]
    Interaction(Option<Box<Interaction>>),
    /// Any tag this build does not know. Normalizing it is a fatal
    /// contract error, never silent coercion.
    Unknown,
}

/// Derive target mirroring [`FieldValue`] for the known tags only.
///
/// `#[serde(other)]` on an adjacently tagged enum rejects unknown tags
/// whose `data` payload is non-null, so the unknown-tag fallback is
/// handled manually below and the known tags delegate to this derive.
#[derive(Deserialize)]
#[serde(remote = "FieldValue", tag = "type", content = "data")]
enum FieldValueDef {
    #[serde(rename = "text")]
    Text(Option<String>),
    #[serde(rename = "filterable-text")]
    FilterableText(Option<String>),
    #[serde(rename = "filterable-text-multi")]
    FilterableTexts(Option<Vec<String>>),
    #[serde(rename = "number")]
    Number(Option<f64>),
    #[serde(rename = "number-multi")]
    Numbers(Option<Vec<f64>>),
    #[serde(rename = "datetime")]
    Datetime(Option<DateTime<Utc>>),
    #[serde(rename = "location")]
    Location(Option<Location>),
    #[serde(rename = "location-multi")]
    Locations(Option<Vec<Location>>),
    #[serde(rename = "dropdown")]
    Dropdown(Option<DropdownOption>),
    #[serde(rename = "ranked-dropdown")]
    RankedDropdown(Option<DropdownOption>),
    #[serde(rename = "dropdown-multi")]
    Dropdowns(Option<Vec<DropdownOption>>),
    #[serde(rename = "person")]
    Person(Option<EntityRef>),
    #[serde(rename = "person-multi")]
    Persons(Option<Vec<EntityRef>>),
    #[serde(rename = "company")]
    Company(Option<EntityRef>),
    #[serde(rename = "company-multi")]
    Companies(Option<Vec<EntityRef>>),
    #[serde(rename = "formula-number")]
    Formula(Option<FormulaNumber>),
    #[serde(rename = "interaction")]
    Interaction(Option<Box<Interaction>>),
    Unknown,
}

/// The wire tags [`FieldValueDef`] recognizes; anything else is `Unknown`.
const KNOWN_TAGS: &[&str] = &[
    "text",
    "filterable-text",
    "filterable-text-multi",
    "number",
    "number-multi",
    "datetime",
    "location",
    "location-multi",
    "dropdown",
    "ranked-dropdown",
    "dropdown-multi",
    "person",
    "person-multi",
    "company",
    "company-multi",
    "formula-number",
    "interaction",
];

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value.get("type").and_then(serde_json::Value::as_str) {
            Some(tag) if !KNOWN_TAGS.contains(&tag) => Ok(FieldValue::Unknown),
            _ => FieldValueDef::deserialize(value).map_err(serde::de::Error::custom),
        }
    }
}

impl FieldValue {
    /// The wire tag for this kind (used in the fields metadata table and in
    /// error messages)
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::FilterableText(_) => "filterable-text",
            Self::FilterableTexts(_) => "filterable-text-multi",
            Self::Number(_) => "number",
            Self::Numbers(_) => "number-multi",
            Self::Datetime(_) => "datetime",
            Self::Location(_) => "location",
            Self::Locations(_) => "location-multi",
            Self::Dropdown(_) => "dropdown",
            Self::RankedDropdown(_) => "ranked-dropdown",
            Self::Dropdowns(_) => "dropdown-multi",
            Self::Person(_) => "person",
            Self::Persons(_) => "person-multi",
            Self::Company(_) => "company",
            Self::Companies(_) => "company-multi",
            Self::Formula(_) => "formula-number",
            Self::Interaction(_) => "interaction",
            Self::Unknown => "unknown",
        }
    }
}

/// A postal/geographic location payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub continent: Option<String>,
}

/// A selectable option of a single/multi-select field
///
/// Option identity is stable and shared across every entity that selects
/// it; options land in per-field dimension tables keyed by
/// `dropdownOptionId`. Ranked dropdowns additionally carry a rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropdownOption {
    pub dropdown_option_id: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
}

/// The calculated payload of a formula field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaNumber {
    #[serde(default)]
    pub calculated_value: Option<f64>,
}
