//! Wire schema for the Affinity REST API
//!
//! One static schema definition, authored once: entities, paged envelopes,
//! the custom-field value union and the polymorphic interaction record.
//! Unknown extra properties on responses are ignored by serde; unknown
//! field-value kinds deserialize to a closed `Unknown` variant instead of
//! being inspected at runtime.

mod field;
mod interaction;

pub use field::{DropdownOption, Field, FieldValue, FormulaNumber, Location};
pub use interaction::{Attendee, Interaction};

use crate::error::Result;
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

// ============================================================================
// Paged envelopes
// ============================================================================

/// A v2 paged response: a data page plus a link-based pagination block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    /// The page of records
    pub data: Vec<T>,
    /// Pagination links
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> Paged<T> {
    /// The absolute URL of the next page, if any
    pub fn next_url(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.next_url.as_deref())
    }
}

/// v2 pagination links
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Absolute URL of the next page (null on the last page)
    #[serde(default)]
    pub next_url: Option<String>,
    /// Absolute URL of the previous page
    #[serde(default)]
    pub prev_url: Option<String>,
}

/// A v1 notes page: records plus a cursor token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesPage {
    /// The page of notes
    pub notes: Vec<Note>,
    /// Cursor for the next page (null on the last page)
    #[serde(default)]
    pub next_page_token: Option<String>,
}

// ============================================================================
// Error envelope
// ============================================================================

/// The error envelope the Affinity API returns on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Server-reported errors
    #[serde(default)]
    pub errors: Vec<ApiErrorItem>,
}

impl ErrorEnvelope {
    /// All server-reported messages joined with newlines
    pub fn joined_messages(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A single server-reported error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorItem {
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Machine-readable code, when present
    #[serde(default)]
    pub code: Option<String>,
}

// ============================================================================
// Entity references
// ============================================================================

/// A reference to another entity inside a field value
///
/// The wire payload may be a full embedded object; only the id is retained,
/// since normalized output carries bare-id references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// The referenced entity id
    pub id: i64,
}

// ============================================================================
// Entities
// ============================================================================

/// A company entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub domains: Option<Vec<String>>,
    /// Custom fields; present only on detail fetches, never serialized onto
    /// the primary record (normalized columns take their place)
    #[serde(default, skip_serializing)]
    pub fields: Option<Vec<Field>>,
}

/// A person entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub primary_email_address: Option<String>,
    #[serde(default)]
    pub email_addresses: Option<Vec<String>>,
    /// "internal" or "external"
    #[serde(default, rename = "type")]
    pub person_type: Option<String>,
    #[serde(default, skip_serializing)]
    pub fields: Option<Vec<Field>>,
}

/// An opportunity entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub list_id: Option<i64>,
    #[serde(default, skip_serializing)]
    pub fields: Option<Vec<Field>>,
}

/// A list (the saved collection itself, not its entries)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModel {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub creator_id: Option<i64>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub is_public: Option<bool>,
    /// Entity kind the list holds ("company", "person", "opportunity")
    #[serde(default, rename = "type")]
    pub list_type: Option<String>,
}

/// A note (v1 API, snake_case wire format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    #[serde(default)]
    pub creator_id: Option<i64>,
    #[serde(default)]
    pub person_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub organization_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub opportunity_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub interaction_id: Option<i64>,
    #[serde(default)]
    pub interaction_type: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "type")]
    pub note_type: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// List entries
// ============================================================================

/// An entry of a list or saved view, wrapping the referenced entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ListEntry {
    #[serde(rename_all = "camelCase")]
    Company {
        id: i64,
        #[serde(default)]
        created_at: Option<DateTime<Utc>>,
        #[serde(default)]
        creator_id: Option<i64>,
        entity: Company,
    },
    #[serde(rename_all = "camelCase")]
    Person {
        id: i64,
        #[serde(default)]
        created_at: Option<DateTime<Utc>>,
        #[serde(default)]
        creator_id: Option<i64>,
        entity: Person,
    },
    #[serde(rename_all = "camelCase")]
    Opportunity {
        id: i64,
        #[serde(default)]
        created_at: Option<DateTime<Utc>>,
        #[serde(default)]
        creator_id: Option<i64>,
        entity: Opportunity,
    },
}

impl ListEntry {
    /// The entry's own id
    pub fn id(&self) -> i64 {
        match self {
            Self::Company { id, .. } | Self::Person { id, .. } | Self::Opportunity { id, .. } => {
                *id
            }
        }
    }

    /// Kind of the wrapped entity
    pub fn entity_kind(&self) -> &'static str {
        match self {
            Self::Company { .. } => "company",
            Self::Person { .. } => "person",
            Self::Opportunity { .. } => "opportunity",
        }
    }

    /// Id of the wrapped entity
    pub fn entity_id(&self) -> i64 {
        match self {
            Self::Company { entity, .. } => entity.id,
            Self::Person { entity, .. } => entity.id,
            Self::Opportunity { entity, .. } => entity.id,
        }
    }

    /// Fields of the wrapped entity
    pub fn fields(&self) -> &[Field] {
        match self {
            Self::Company { entity, .. } => entity.fields.as_deref().unwrap_or_default(),
            Self::Person { entity, .. } => entity.fields.as_deref().unwrap_or_default(),
            Self::Opportunity { entity, .. } => entity.fields.as_deref().unwrap_or_default(),
        }
    }

    /// Entry-level metadata as record columns (entity excluded)
    pub fn base_record(&self) -> JsonObject {
        let (created_at, creator_id) = match self {
            Self::Company {
                created_at,
                creator_id,
                ..
            }
            | Self::Person {
                created_at,
                creator_id,
                ..
            }
            | Self::Opportunity {
                created_at,
                creator_id,
                ..
            } => (created_at, creator_id),
        };

        let mut record = JsonObject::new();
        record.insert("id".into(), json!(self.id()));
        record.insert("type".into(), json!(self.entity_kind()));
        record.insert("createdAt".into(), json!(created_at));
        record.insert("creatorId".into(), json!(creator_id));
        record.insert("entity_id".into(), json!(self.entity_id()));
        record
    }
}

// ============================================================================
// Fielded entities
// ============================================================================

/// Entities that carry an id and an open set of custom fields
///
/// The orchestrator is generic over this seam: the same two-phase fetch and
/// normalization path serves companies, persons and opportunities.
pub trait FieldedEntity: Serialize {
    /// Stable entity id
    fn entity_id(&self) -> i64;

    /// Custom fields attached to this snapshot (empty on ID stubs)
    fn fields(&self) -> &[Field];

    /// Serialize the entity's scalar attributes (fields excluded) into a
    /// record object
    fn base_record(&self) -> Result<JsonObject> {
        match serde_json::to_value(self)? {
            JsonValue::Object(map) => Ok(map),
            other => Err(crate::error::Error::schema_validation(
                "entity record",
                format!("expected object, got {other}"),
            )),
        }
    }
}

impl FieldedEntity for Company {
    fn entity_id(&self) -> i64 {
        self.id
    }

    fn fields(&self) -> &[Field] {
        self.fields.as_deref().unwrap_or_default()
    }
}

impl FieldedEntity for Person {
    fn entity_id(&self) -> i64 {
        self.id
    }

    fn fields(&self) -> &[Field] {
        self.fields.as_deref().unwrap_or_default()
    }
}

impl FieldedEntity for Opportunity {
    fn entity_id(&self) -> i64 {
        self.id
    }

    fn fields(&self) -> &[Field] {
        self.fields.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests;
