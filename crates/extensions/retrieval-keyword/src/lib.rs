//! Keyword retrieval for contexta.
//!
//! A [`KeywordSearch`](contexta_protocols::KeywordSearch) adapter over a
//! SQLite FTS5 table. Documents are ranked with BM25; scores are negated so
//! higher means more relevant.

mod fts;

pub use fts::{escape_fts_query, Fts5KeywordSearch};
