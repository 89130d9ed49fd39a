//! # Store Indexer Query
//!
//! Read path over the store search index.
//!
//! `SearchEngine` builds and executes keyword-recommendation, autocomplete,
//! pure-semantic, hybrid, name and geo-distance queries. It never fails
//! outward: an internal error is logged and turned into an empty result,
//! and hybrid search first falls back to keyword recommendation.
//! `Paginator` serves keyset-paginated owner listings from the
//! system-of-record.

pub mod config;
pub mod engine;
pub mod geo;
pub mod paginator;

pub use config::SearchConfig;
pub use engine::SearchEngine;
pub use paginator::Paginator;
