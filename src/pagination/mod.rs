//! Pagination strategies
//!
//! The Affinity API paginates two ways: v2 endpoints return an absolute
//! next-page URL in the body (`pagination.nextUrl`), v1 endpoints return a
//! cursor token (`next_page_token`) echoed back as a query parameter.

mod strategies;
mod types;

pub use strategies::{CursorPaginator, NextUrlPaginator};
pub use types::{NextPage, PaginationState, Paginator};
