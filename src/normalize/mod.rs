//! Field value normalization
//!
//! Converts one entity's open-ended field list into flat output: a column
//! map merged onto the entity's primary record, plus auxiliary records for
//! the side-tables (per-field dropdown-option dimensions, flattened
//! interactions, and the shared `fields` metadata table).
//!
//! Both outputs come from a single pass over the field list: metadata
//! emission is interleaved with value-kind dispatch, so the traversal
//! happens once per entity. The transform is pure and synchronous; it is
//! safe to run concurrently across distinct entities.

use crate::error::{Error, Result};
use crate::model::{DropdownOption, Field, FieldValue, Interaction};
use crate::record::{Table, TableReference, TaggedRecord};
use crate::types::{JsonObject, JsonValue};
use serde_json::json;

/// The normalized output for one entity's fields
#[derive(Debug, Default)]
pub struct NormalizedFields {
    /// Column name to value, merged onto the entity's primary record
    pub columns: JsonObject,
    /// Auxiliary records destined for side-tables
    pub aux: Vec<TaggedRecord>,
}

/// Name of the per-field dropdown-option dimension table
pub fn dropdown_options_table(field: &Field) -> String {
    format!("dropdown_options_{}", field.id)
}

/// Normalize an entity's fields into primary-record columns and auxiliary
/// records
///
/// `origin_table` is the table the owning entity lands in; the fields
/// metadata records reference it for lineage.
///
/// # Errors
///
/// Formula values and unrecognized kinds are fatal
/// ([`Error::UnimplementedFieldKind`]): the contract between this
/// normalizer and the upstream schema has a gap, and partial or coerced
/// output would corrupt the destination. No columns or auxiliary records
/// are returned in that case.
pub fn normalize_fields(fields: &[Field], origin_table: &str) -> Result<NormalizedFields> {
    let mut out = NormalizedFields::default();

    for field in fields {
        // Every field contributes one metadata record, whatever its kind.
        out.aux.push(field_metadata_record(field, origin_table)?);

        let column = field.column_name();
        match &field.value {
            FieldValue::Text(data) => {
                out.columns.insert(column, json!(data));
            }
            FieldValue::FilterableText(data) => {
                out.columns.insert(column, json!(data));
            }
            FieldValue::FilterableTexts(data) => {
                out.columns.insert(column, json!(data));
            }
            FieldValue::Number(data) => {
                out.columns.insert(column, json!(data));
            }
            FieldValue::Numbers(data) => {
                out.columns.insert(column, json!(data));
            }
            FieldValue::Datetime(data) => {
                out.columns.insert(column, json!(data));
            }
            FieldValue::Location(data) => {
                out.columns.insert(column, serde_json::to_value(data)?);
            }
            FieldValue::Locations(data) => {
                out.columns.insert(column, serde_json::to_value(data)?);
            }
            FieldValue::Dropdown(data) | FieldValue::RankedDropdown(data) => {
                out.columns.insert(
                    format!("{column}_dropdown_option_id"),
                    json!(data.as_ref().map(|d| d.dropdown_option_id)),
                );
                if let Some(option) = data {
                    out.aux.push(dropdown_option_record(option, field)?);
                }
            }
            FieldValue::Dropdowns(data) => {
                let options = data.as_deref().unwrap_or_default();
                out.columns.insert(column, serde_json::to_value(options)?);
                for option in options {
                    out.aux.push(dropdown_option_record(option, field)?);
                }
            }
            FieldValue::Person(data) | FieldValue::Company(data) => {
                out.columns
                    .insert(column, json!(data.as_ref().map(|r| r.id)));
            }
            FieldValue::Persons(data) | FieldValue::Companies(data) => {
                let ids: Vec<i64> = data
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|r| r.id)
                    .collect();
                out.columns.insert(column, json!(ids));
            }
            FieldValue::Interaction(data) => {
                match data {
                    Some(interaction) => {
                        out.columns.insert(column, interaction.summary());
                        out.aux.push(interaction_record(interaction));
                    }
                    None => {
                        out.columns.insert(column, JsonValue::Null);
                    }
                };
            }
            FieldValue::Formula(_) | FieldValue::Unknown => {
                return Err(Error::unimplemented_kind(
                    &field.id,
                    field.value.kind_name(),
                ));
            }
        }
    }

    Ok(out)
}

/// The lightweight metadata record every field emits into the shared
/// `fields` table
fn field_metadata_record(field: &Field, origin_table: &str) -> Result<TaggedRecord> {
    let mut data = JsonObject::new();
    data.insert("id".into(), json!(field.id));
    data.insert("name".into(), json!(field.name));
    data.insert("type".into(), json!(field.category));
    data.insert("enrichmentSource".into(), json!(field.enrichment_source));
    data.insert("value_type".into(), json!(field.value.kind_name()));

    Ok(
        TaggedRecord::merge(Table::Fields.as_str(), vec!["id".into()], &field.id, data)
            .with_references(vec![TableReference::simple("id", "id", origin_table)]),
    )
}

/// One row of the per-field dropdown-option dimension table
fn dropdown_option_record(option: &DropdownOption, field: &Field) -> Result<TaggedRecord> {
    let data = match serde_json::to_value(option)? {
        JsonValue::Object(map) => map,
        other => {
            return Err(Error::schema_validation(
                "dropdown option",
                format!("expected object, got {other}"),
            ))
        }
    };

    Ok(TaggedRecord::merge(
        dropdown_options_table(field),
        vec!["dropdownOptionId".into()],
        option.dropdown_option_id.to_string(),
        data,
    ))
}

/// One flattened row of the shared `interactions` table
fn interaction_record(interaction: &Interaction) -> TaggedRecord {
    TaggedRecord::merge(
        Table::Interactions.as_str(),
        vec!["id".into(), "type".into()],
        format!("{}:{}", interaction.id(), interaction.kind()),
        interaction.flattened(),
    )
}
