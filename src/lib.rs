// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Affinity Source
//!
//! An extractor for the Affinity CRM API producing normalized tabular
//! records, ready for a relational sink.
//!
//! ## Features
//!
//! - **Two-Phase Entity Fetch**: cheap ID enumeration, then parallel
//!   batched detail requests for companies, persons and opportunities
//! - **Field Normalization**: the open-ended custom-field union becomes
//!   flat columns plus dimension tables (dropdown options, interactions,
//!   field metadata)
//! - **List Entries**: extract entries of whole lists or saved views into
//!   per-list tables
//! - **Dual API Coverage**: v2 (bearer, link pagination) and v1 (basic
//!   auth, cursor pagination) endpoints behind one client
//! - **Resilient HTTP**: retries with backoff, rate limiting, structured
//!   decoding of the Affinity error envelope
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use affinity_source::{AffinitySource, ListReference, SourceConfig};
//!
//! #[tokio::main]
//! async fn main() -> affinity_source::Result<()> {
//!     let config = SourceConfig::new(std::env::var("AFFINITY_API_KEY").unwrap())
//!         .with_list_ref(ListReference::new(247888));
//!     let source = AffinitySource::new(config)?;
//!
//!     for record in source.extract().await? {
//!         println!("{} -> {}", record.row_id, record.table);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod normalize;
pub mod pagination;
pub mod record;
pub mod source;
pub mod types;

pub use config::{SourceConfig, DEFAULT_API_BASE};
pub use error::{Error, Result};
pub use normalize::{normalize_fields, NormalizedFields};
pub use record::{Table, TableReference, TaggedRecord, WriteDisposition};
pub use source::{AffinitySource, EntityKind, ListReference};
