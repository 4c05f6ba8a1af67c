//! Entity fetch orchestration
//!
//! `AffinitySource` drives extraction for every resource: the two-phase
//! entity fetch (cheap ID enumeration, then parallel batched detail
//! requests), the lists and notes resources, and list-entry extraction for
//! configured `ListReference`s. All fetches share two explicitly
//! constructed HTTP clients (v2 bearer, v1 basic) and emit
//! [`TaggedRecord`]s for an external sink.
//!
//! The detail phase deliberately avoids cursor paging: phase one walks the
//! cheap listing endpoint once to learn the universe of ids, and phase two
//! requests details for explicit id batches, which can run concurrently
//! without coordinating a shared cursor.

mod list_reference;

pub use list_reference::ListReference;

use crate::auth::AuthConfig;
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig, RequestConfig};
use crate::model::{
    Company, FieldedEntity, ListEntry, ListModel, Note, NotesPage, Opportunity, Paged, Person,
};
use crate::normalize::normalize_fields;
use crate::pagination::{CursorPaginator, NextPage, NextUrlPaginator, PaginationState, Paginator};
use crate::record::{Table, TableReference, TaggedRecord};
use crate::types::{JsonObject, JsonValue};
use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Maximum page size on v1 endpoints
pub const MAX_PAGE_LIMIT_V1: usize = 500;

/// Maximum page size on v2 endpoints (also the detail batch size)
pub const MAX_PAGE_LIMIT_V2: usize = 100;

/// Path prefix of the v2 API under the shared base URL
const V2_PREFIX: &str = "/v2";

/// Field-type categories requested on detail fetches
const DETAIL_FIELD_TYPES: [&str; 3] = ["enriched", "global", "relationship-intelligence"];

/// Field-type categories requested on list-entry fetches
const LIST_FIELD_TYPES: [&str; 4] = ["enriched", "global", "relationship-intelligence", "list"];

// ============================================================================
// Entity kinds
// ============================================================================

/// The entity kinds that go through the two-phase fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Companies,
    Persons,
    Opportunities,
}

impl EntityKind {
    /// All entity kinds, in extraction order
    pub const ALL: [EntityKind; 3] = [Self::Companies, Self::Persons, Self::Opportunities];

    /// The v2 listing/detail endpoint path
    pub fn path(&self) -> &'static str {
        match self {
            Self::Companies => "companies",
            Self::Persons => "persons",
            Self::Opportunities => "opportunities",
        }
    }

    /// The destination table
    pub fn table(&self) -> Table {
        match self {
            Self::Companies => Table::Companies,
            Self::Persons => Table::Persons,
            Self::Opportunities => Table::Opportunities,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Lightweight stub from the ID enumeration phase
#[derive(Debug, Clone, Deserialize)]
struct IdStub {
    id: i64,
}

// ============================================================================
// Source
// ============================================================================

/// The Affinity extraction orchestrator
pub struct AffinitySource {
    /// v2 client (bearer auth, base URL ends in `/v2`)
    v2: HttpClient,
    /// v1 client (basic auth with empty username)
    v1: HttpClient,
    config: SourceConfig,
}

impl AffinitySource {
    /// Build a source from config, constructing both API clients
    pub fn new(config: SourceConfig) -> Result<Self> {
        config.validate()?;

        let base = config.base_url.trim_end_matches('/');
        let rate_limit =
            RateLimiterConfig::new(config.requests_per_second, config.requests_per_second);

        let v2_config = HttpClientConfig::builder()
            .base_url(format!("{base}{V2_PREFIX}"))
            .max_retries(config.max_retries)
            .rate_limit(rate_limit.clone())
            .build();
        let v2 = HttpClient::with_auth(v2_config, AuthConfig::bearer(&config.api_key));

        let v1_config = HttpClientConfig::builder()
            .base_url(base)
            .max_retries(config.max_retries)
            .rate_limit(rate_limit)
            .build();
        let v1 = HttpClient::with_auth(v1_config, AuthConfig::basic_api_key(&config.api_key));

        Ok(Self { v2, v1, config })
    }

    /// The configuration this source was built with
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    // ========================================================================
    // Full extraction
    // ========================================================================

    /// Extract every configured resource
    ///
    /// Companies, persons and opportunities via the two-phase fetch, then
    /// lists, notes, and entries of each configured list reference.
    pub async fn extract(&self) -> Result<Vec<TaggedRecord>> {
        let mut records = Vec::new();

        for kind in EntityKind::ALL {
            records.extend(self.fetch_entities(kind).await?);
        }
        records.extend(self.fetch_lists().await?);
        records.extend(self.fetch_notes().await?);
        for list_ref in &self.config.list_refs {
            records.extend(self.fetch_list_entries(*list_ref).await?);
        }

        info!("Extraction complete: {} records", records.len());
        Ok(records)
    }

    // ========================================================================
    // Two-phase entity fetch
    // ========================================================================

    /// Fetch all records for one entity kind: ID pages, then parallel
    /// detail batches
    pub async fn fetch_entities(&self, kind: EntityKind) -> Result<Vec<TaggedRecord>> {
        let ids = self.fetch_entity_ids(kind).await?;
        let batches: Vec<&[i64]> = ids.chunks(MAX_PAGE_LIMIT_V2).collect();

        let results: Vec<Result<Vec<TaggedRecord>>> = stream::iter(batches)
            .map(|batch| self.fetch_entity_batch(kind, batch))
            .buffer_unordered(self.config.batch_concurrency)
            .collect()
            .await;

        // Batches are independent: let all of them finish, then surface the
        // first failure rather than silently dropping it.
        let mut records = Vec::new();
        let mut first_error = None;
        for result in results {
            match result {
                Ok(batch) => records.extend(batch),
                Err(e) => {
                    warn!("{kind} detail batch failed: {e}");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(records),
        }
    }

    /// Phase one: enumerate entity ids via the cheap listing endpoint
    ///
    /// No field enrichment is requested here; the stubs exist purely to
    /// discover the universe of ids for the detail phase.
    pub async fn fetch_entity_ids(&self, kind: EntityKind) -> Result<Vec<i64>> {
        let base = RequestConfig::new().query("limit", MAX_PAGE_LIMIT_V2.to_string());
        let pages = self
            .fetch_v2_pages::<IdStub>(kind.path(), base, kind.path(), self.config.sample_limit)
            .await?;

        let mut ids: Vec<i64> = pages
            .into_iter()
            .flat_map(|page| page.data)
            .map(|stub| stub.id)
            .collect();
        if let Some(max) = self.config.sample_limit {
            ids.truncate(max);
        }

        info!("Enumerated {} {kind} ids", ids.len());
        Ok(ids)
    }

    /// Phase two: fetch details for one explicit id batch and emit records
    pub async fn fetch_entity_batch(
        &self,
        kind: EntityKind,
        ids: &[i64],
    ) -> Result<Vec<TaggedRecord>> {
        let request = RequestConfig::new()
            .query("limit", ids.len().to_string())
            .query_each("ids", ids.iter().copied())
            .query_each("fieldTypes", DETAIL_FIELD_TYPES);

        let response = self.v2.get_with_config(kind.path(), request).await?;
        let text = response.text().await.map_err(Error::Http)?;

        match kind {
            EntityKind::Companies => emit_detail_page::<Company>(&text, kind),
            EntityKind::Persons => emit_detail_page::<Person>(&text, kind),
            EntityKind::Opportunities => emit_detail_page::<Opportunity>(&text, kind),
        }
    }

    // ========================================================================
    // Lists
    // ========================================================================

    /// Fetch metadata about lists themselves (not their entries)
    pub async fn fetch_lists(&self) -> Result<Vec<TaggedRecord>> {
        let base = RequestConfig::new().query("limit", MAX_PAGE_LIMIT_V2.to_string());
        let pages = self
            .fetch_v2_pages::<ListModel>("lists", base, "lists", self.config.sample_limit)
            .await?;

        let mut records = Vec::new();
        for list in pages.into_iter().flat_map(|page| page.data) {
            let data = object_of(&list, "list record")?;
            records.push(TaggedRecord::replace(
                Table::Lists.as_str(),
                "id",
                list.id.to_string(),
                data,
            ));
        }
        if let Some(max) = self.config.sample_limit {
            records.truncate(max);
        }
        Ok(records)
    }

    // ========================================================================
    // Notes
    // ========================================================================

    /// Fetch all notes via the v1 cursor-paginated endpoint
    pub async fn fetch_notes(&self) -> Result<Vec<TaggedRecord>> {
        let paginator = CursorPaginator::new("page_token", "/next_page_token");
        let mut state = PaginationState::new();
        let mut records = Vec::new();

        loop {
            let mut request = RequestConfig::new().query("page_size", MAX_PAGE_LIMIT_V1.to_string());
            for (key, value) in paginator.initial_params(&state) {
                request = request.query(key, value);
            }

            let response = self.v1.get_with_config("notes", request).await?;
            let headers = response.headers().clone();
            let text = response.text().await.map_err(Error::Http)?;
            let body: JsonValue = serde_json::from_str(&text)?;
            let page: NotesPage = serde_json::from_str(&text)
                .map_err(|e| Error::schema_validation("notes", e.to_string()))?;

            let count = page.notes.len();
            debug!("Notes page {}: {count} records", state.page + 1);
            for note in &page.notes {
                records.push(note_record(note)?);
            }

            if let Some(max) = self.config.sample_limit {
                if records.len() >= max {
                    records.truncate(max);
                    break;
                }
            }

            if paginator
                .process_response(&body, &headers, count, &mut state)
                .is_done()
            {
                break;
            }
        }

        info!("Fetched {} notes", records.len());
        Ok(records)
    }

    // ========================================================================
    // List entries
    // ========================================================================

    /// Fetch entries of one list or saved view
    ///
    /// Each entry wraps a referenced entity whose fields go through the
    /// same normalizer as detail fetches, with the list-scoped field-type
    /// category added. Records land in a table derived from the reference,
    /// so different lists/views stay disjoint.
    pub async fn fetch_list_entries(&self, list_ref: ListReference) -> Result<Vec<TaggedRecord>> {
        let table = list_ref.table_name();
        let base = RequestConfig::new()
            .query("limit", MAX_PAGE_LIMIT_V2.to_string())
            .query_each("fieldTypes", LIST_FIELD_TYPES);
        let context = format!("list entries for {list_ref}");
        let pages = self
            .fetch_v2_pages::<ListEntry>(
                &list_ref.entries_path(),
                base,
                &context,
                self.config.sample_limit,
            )
            .await?;

        let mut records = Vec::new();
        let mut emitted = 0usize;
        for entry in pages.into_iter().flat_map(|page| page.data) {
            if self.config.sample_limit.is_some_and(|max| emitted >= max) {
                break;
            }

            let normalized = normalize_fields(entry.fields(), &table)?;
            records.extend(normalized.aux);

            let mut data = entry.base_record();
            data.extend(normalized.columns);
            records.push(
                TaggedRecord::replace(&table, "id", entry.id().to_string(), data)
                    .with_merge_key(vec!["id".into()])
                    .with_max_nesting(3),
            );
            emitted += 1;
        }

        info!("Fetched {emitted} entries for list {list_ref}");
        Ok(records)
    }

    // ========================================================================
    // Paged fetch plumbing
    // ========================================================================

    /// Walk a v2 link-paginated endpoint, validating each page
    ///
    /// The first request carries `base` parameters; follow-up requests use
    /// the absolute next-URL from the body, which already embeds them.
    /// `limit` stops paging early once enough records arrived (dev mode).
    async fn fetch_v2_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        base: RequestConfig,
        context: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Paged<T>>> {
        let paginator = NextUrlPaginator::new("/pagination/nextUrl");
        let mut state = PaginationState::new();
        let mut url = path.to_string();
        let mut first = true;
        let mut pages = Vec::new();
        let mut fetched = 0usize;

        loop {
            let request = if first {
                base.clone()
            } else {
                RequestConfig::new()
            };
            let response = self.v2.get_with_config(&url, request).await?;
            let headers = response.headers().clone();
            let text = response.text().await.map_err(Error::Http)?;
            let body: JsonValue = serde_json::from_str(&text)?;
            let page: Paged<T> = serde_json::from_str(&text)
                .map_err(|e| Error::schema_validation(context, e.to_string()))?;

            let count = page.data.len();
            fetched += count;
            debug!("{context} page {}: {count} records", state.page + 1);
            pages.push(page);

            if limit.is_some_and(|max| fetched >= max) {
                break;
            }

            match paginator.process_response(&body, &headers, count, &mut state) {
                NextPage::Continue { url: Some(next), .. } => {
                    url = next;
                    first = false;
                }
                _ => break,
            }
        }

        Ok(pages)
    }
}

impl std::fmt::Debug for AffinitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AffinitySource")
            .field("base_url", &self.config.base_url)
            .field("list_refs", &self.config.list_refs)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Record emission
// ============================================================================

/// Validate a detail page against the paged entity schema and emit records
fn emit_detail_page<T: FieldedEntity + DeserializeOwned>(
    text: &str,
    kind: EntityKind,
) -> Result<Vec<TaggedRecord>> {
    let page: Paged<T> = serde_json::from_str(text)
        .map_err(|e| Error::schema_validation(format!("{kind} detail page"), e.to_string()))?;

    let mut records = Vec::new();
    for entity in &page.data {
        records.extend(entity_records(entity, kind)?);
    }
    Ok(records)
}

/// Emit the primary record plus normalization side-records for one entity
fn entity_records<T: FieldedEntity>(entity: &T, kind: EntityKind) -> Result<Vec<TaggedRecord>> {
    let table = kind.table().as_str();
    let normalized = normalize_fields(entity.fields(), table)?;

    let mut records = normalized.aux;
    let mut data = entity.base_record()?;
    data.extend(normalized.columns);
    records.push(
        TaggedRecord::replace(table, "id", entity.entity_id().to_string(), data)
            .with_merge_key(vec!["id".into()])
            .with_max_nesting(3),
    );
    Ok(records)
}

/// The replace-disposition record for one note, with lineage references
fn note_record(note: &Note) -> Result<TaggedRecord> {
    let data = object_of(note, "note record")?;
    Ok(
        TaggedRecord::replace(Table::Notes.as_str(), "id", note.id.to_string(), data)
            .with_max_nesting(1)
            .with_references(vec![
                TableReference::simple("creator_id", "id", Table::Persons.as_str()),
                TableReference {
                    columns: vec!["interaction_id".into(), "interaction_type".into()],
                    referenced_columns: vec!["id".into(), "type".into()],
                    referenced_table: Table::Interactions.as_str().into(),
                },
                TableReference::simple("parent_id", "id", Table::Notes.as_str()),
            ]),
    )
}

/// Serialize any model into a record object
fn object_of<T: serde::Serialize>(value: &T, context: &str) -> Result<JsonObject> {
    match serde_json::to_value(value)? {
        JsonValue::Object(map) => Ok(map),
        other => Err(Error::schema_validation(
            context,
            format!("expected object, got {other}"),
        )),
    }
}
