//! Tagged output records
//!
//! The extractor's outbound interface is a stream of records, each tagged
//! with its destination table, write disposition, key columns, lineage
//! references and a synthetic row id derived from the natural key. The sink
//! that consumes them is out of scope; merge-by-key semantics make final
//! state independent of arrival order.

use crate::types::JsonObject;
use serde::{Deserialize, Serialize};

// ============================================================================
// Well-known tables
// ============================================================================

/// The fixed destination tables (list-entry tables are derived per list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Companies,
    Persons,
    Opportunities,
    Notes,
    Lists,
    Interactions,
    Fields,
}

impl Table {
    /// The destination table name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Companies => "companies",
            Self::Persons => "persons",
            Self::Opportunities => "opportunities",
            Self::Notes => "notes",
            Self::Lists => "lists",
            Self::Interactions => "interactions",
            Self::Fields => "fields",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Write disposition
// ============================================================================

/// How the sink should write a record's table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteDisposition {
    /// Truncate-and-load: each full run supersedes prior content
    #[default]
    Replace,
    /// Upsert-by-key: incoming rows replace existing rows sharing the key
    Merge,
}

// ============================================================================
// Lineage references
// ============================================================================

/// A foreign-key-style reference to another table
///
/// Documentation/lineage only; nothing enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReference {
    /// Referencing columns on this table
    pub columns: Vec<String>,
    /// Referenced columns on the target table
    pub referenced_columns: Vec<String>,
    /// Target table name
    pub referenced_table: String,
}

impl TableReference {
    /// Single-column reference
    pub fn simple(
        column: impl Into<String>,
        referenced_column: impl Into<String>,
        referenced_table: impl Into<String>,
    ) -> Self {
        Self {
            columns: vec![column.into()],
            referenced_columns: vec![referenced_column.into()],
            referenced_table: referenced_table.into(),
        }
    }
}

// ============================================================================
// Tagged record
// ============================================================================

/// One output record plus everything the sink needs to route and key it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedRecord {
    /// Destination table name
    pub table: String,
    /// Write disposition for the table
    pub write_disposition: WriteDisposition,
    /// Primary key column(s)
    pub primary_key: Vec<String>,
    /// Merge key column(s), when distinct from the primary key
    #[serde(default)]
    pub merge_key: Option<Vec<String>>,
    /// Lineage references to other tables
    #[serde(default)]
    pub references: Vec<TableReference>,
    /// Bound on nested-structure flattening depth, when the sink flattens
    #[serde(default)]
    pub max_nesting: Option<u8>,
    /// Synthetic row identity derived from the natural key
    pub row_id: String,
    /// The record payload
    pub data: JsonObject,
}

impl TaggedRecord {
    /// A replace-disposition record keyed by a single column
    pub fn replace(
        table: impl Into<String>,
        primary_key: impl Into<String>,
        row_id: impl Into<String>,
        data: JsonObject,
    ) -> Self {
        Self {
            table: table.into(),
            write_disposition: WriteDisposition::Replace,
            primary_key: vec![primary_key.into()],
            merge_key: None,
            references: Vec::new(),
            max_nesting: None,
            row_id: row_id.into(),
            data,
        }
    }

    /// A merge-disposition record; the merge key mirrors the primary key
    pub fn merge(
        table: impl Into<String>,
        key_columns: Vec<String>,
        row_id: impl Into<String>,
        data: JsonObject,
    ) -> Self {
        Self {
            table: table.into(),
            write_disposition: WriteDisposition::Merge,
            primary_key: key_columns.clone(),
            merge_key: Some(key_columns),
            references: Vec::new(),
            max_nesting: None,
            row_id: row_id.into(),
            data,
        }
    }

    /// Set a merge key distinct from (or mirroring) the primary key
    #[must_use]
    pub fn with_merge_key(mut self, merge_key: Vec<String>) -> Self {
        self.merge_key = Some(merge_key);
        self
    }

    /// Attach lineage references
    #[must_use]
    pub fn with_references(mut self, references: Vec<TableReference>) -> Self {
        self.references = references;
        self
    }

    /// Bound nested-structure flattening depth
    #[must_use]
    pub fn with_max_nesting(mut self, depth: u8) -> Self {
        self.max_nesting = Some(depth);
        self
    }
}
