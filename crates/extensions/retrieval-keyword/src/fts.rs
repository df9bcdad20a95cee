//! SQLite FTS5 keyword index.

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use contexta_protocols::{
    CandidateSnippet, KeywordSearch, Origin, RetrievalError, SnippetMetadata,
};

const SCHEMA: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS snippets_fts USING fts5(
    id UNINDEXED,
    collection UNINDEXED,
    content,
    tags,
    metadata UNINDEXED,
    tokenize='porter unicode61'
);
"#;

/// One matching row before metadata decoding.
type Row = (String, String, String, String, f64);

/// Keyword search over an FTS5 table.
pub struct Fts5KeywordSearch {
    conn: Connection,
    id: String,
}

impl Fts5KeywordSearch {
    /// Open (or create) the index at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        let path = path.as_ref();
        let conn = Connection::open(path).await.map_err(|e| {
            RetrievalError::IndexUnavailable(format!("{}: {}", path.display(), e))
        })?;
        Self::init(conn, format!("fts5:{}", path.display())).await
    }

    /// An empty in-memory index.
    pub async fn in_memory() -> Result<Self, RetrievalError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RetrievalError::IndexUnavailable(e.to_string()))?;
        Self::init(conn, "fts5:memory".to_string()).await
    }

    async fn init(conn: Connection, id: String) -> Result<Self, RetrievalError> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(|e| RetrievalError::IndexUnavailable(e.to_string()))?;

        debug!(index = %id, "Keyword index ready");
        Ok(Self { conn, id })
    }

    /// Insert or replace snippets by id.
    pub async fn index(&self, snippets: &[CandidateSnippet]) -> Result<(), RetrievalError> {
        let mut rows = Vec::with_capacity(snippets.len());
        for snippet in snippets {
            let metadata = serde_json::to_string(&snippet.metadata)
                .map_err(|e| RetrievalError::InvalidInput(e.to_string()))?;
            rows.push((
                snippet.id.clone(),
                snippet.collection.clone(),
                snippet.text.clone(),
                snippet.metadata.tags.join(" "),
                metadata,
            ));
        }
        let count = rows.len();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for (id, collection, content, tags, metadata) in rows {
                    tx.execute("DELETE FROM snippets_fts WHERE id = ?1", rusqlite::params![id])?;
                    tx.execute(
                        "INSERT INTO snippets_fts (id, collection, content, tags, metadata) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        rusqlite::params![id, collection, content, tags, metadata],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|e| RetrievalError::IndexUnavailable(e.to_string()))?;

        debug!(index = %self.id, count, "Indexed snippets");
        Ok(())
    }

    /// Remove a snippet from the index.
    pub async fn remove(&self, id: &str) -> Result<(), RetrievalError> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM snippets_fts WHERE id = ?1", rusqlite::params![id])?;
                Ok(())
            })
            .await
            .map_err(|e| RetrievalError::IndexUnavailable(e.to_string()))
    }

    /// Number of indexed snippets.
    pub async fn count(&self) -> Result<usize, RetrievalError> {
        self.conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM snippets_fts", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(|e| RetrievalError::IndexUnavailable(e.to_string()))
    }

    /// Run a raw FTS5 MATCH expression.
    pub async fn search_raw(
        &self,
        expression: &str,
        limit: usize,
    ) -> Result<Vec<CandidateSnippet>, RetrievalError> {
        let expression = expression.to_string();
        let rows: Vec<Row> = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, collection, content, metadata, bm25(snippets_fts) AS rank
                    FROM snippets_fts
                    WHERE snippets_fts MATCH ?1
                    ORDER BY rank
                    LIMIT ?2
                    "#,
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![expression, limit as i64], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                    })?
                    .collect::<Result<Vec<Row>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| RetrievalError::QueryError(format!("FTS search failed: {}", e)))?;

        Ok(rows.into_iter().map(|row| self.to_snippet(row)).collect())
    }

    fn to_snippet(&self, (id, collection, content, metadata, rank): Row) -> CandidateSnippet {
        let metadata = serde_json::from_str::<SnippetMetadata>(&metadata).unwrap_or_else(|e| {
            warn!(index = %self.id, snippet_id = %id, error = %e, "Unreadable snippet metadata");
            SnippetMetadata::default()
        });
        // bm25() is lower-is-better.
        CandidateSnippet::new(id, collection, content, Origin::Keyword, -rank as f32)
            .with_metadata(metadata)
    }
}

#[async_trait]
impl KeywordSearch for Fts5KeywordSearch {
    fn id(&self) -> &str {
        &self.id
    }

    async fn search(&self, text: &str, limit: usize) -> Result<Vec<CandidateSnippet>, RetrievalError> {
        let expression = escape_fts_query(text);
        if expression.is_empty() {
            return Err(RetrievalError::InvalidInput(
                "keyword query has no searchable terms".to_string(),
            ));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.search_raw(&expression, limit).await
    }
}

/// Quote every alphanumeric term and OR them together so user text never
/// parses as FTS5 syntax. Terms are split the way the `unicode61` tokenizer
/// splits indexed text, so "Lakers's" still matches "Lakers".
pub fn escape_fts_query(text: &str) -> String {
    let mut terms: Vec<&str> = Vec::new();
    for term in text.split(|c: char| !c.is_alphanumeric()) {
        if !term.is_empty() && !terms.iter().any(|t| t.eq_ignore_ascii_case(term)) {
            terms.push(term);
        }
    }
    terms
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[cfg(test)]
#[path = "fts_tests.rs"]
mod tests;
