//! Pagination strategy implementations

use super::types::{NextPage, PaginationState, Paginator};
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Next URL Pagination
// ============================================================================

/// Next URL pagination (URL in response body)
///
/// Extracts the absolute next-page URL from a field in the response body,
/// e.g. `{ "pagination": { "nextUrl": "..." } }` on Affinity v2 endpoints.
#[derive(Debug, Clone)]
pub struct NextUrlPaginator {
    /// JSON pointer to the next URL in the response body
    pub pointer: String,
}

impl NextUrlPaginator {
    /// Create a new next URL paginator
    ///
    /// `pointer` is a JSON pointer, e.g. `/pagination/nextUrl`.
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
        }
    }
}

impl Paginator for NextUrlPaginator {
    fn initial_params(&self, _state: &PaginationState) -> HashMap<String, String> {
        HashMap::new()
    }

    fn process_response(
        &self,
        body: &Value,
        _headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count as u64);

        if let Some(next_url) = body.pointer(&self.pointer).and_then(Value::as_str) {
            if !next_url.is_empty() {
                state.next_page();
                return NextPage::with_url(next_url);
            }
        }

        state.mark_done();
        NextPage::Done
    }
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor-token pagination
///
/// Extracts a cursor token from the response body and sends it back as a
/// query parameter, e.g. `next_page_token` echoed as `page_token` on
/// Affinity v1 endpoints. A missing or empty token ends pagination.
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Query parameter name for the cursor
    pub cursor_param: String,
    /// JSON pointer to the cursor in the response body
    pub cursor_pointer: String,
}

impl CursorPaginator {
    /// Create a new cursor paginator
    pub fn new(cursor_param: impl Into<String>, cursor_pointer: impl Into<String>) -> Self {
        Self {
            cursor_param: cursor_param.into(),
            cursor_pointer: cursor_pointer.into(),
        }
    }
}

impl Paginator for CursorPaginator {
    fn initial_params(&self, state: &PaginationState) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if let Some(cursor) = &state.cursor {
            params.insert(self.cursor_param.clone(), cursor.clone());
        }
        params
    }

    fn process_response(
        &self,
        body: &Value,
        _headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count as u64);

        if let Some(cursor) = body.pointer(&self.cursor_pointer).and_then(Value::as_str) {
            if !cursor.is_empty() {
                state.next_page();
                state.set_cursor(cursor.to_string());
                return NextPage::with_param(&self.cursor_param, cursor);
            }
        }

        state.mark_done();
        NextPage::Done
    }
}
