//! Candidate snippets produced by the retrieval adapters.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which retrieval backend produced a snippet.
///
/// Variant order is the fusion tie-break priority: vector before keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Vector,
    Keyword,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Vector => write!(f, "vector"),
            Origin::Keyword => write!(f, "keyword"),
        }
    }
}

/// A typed value in the per-collection metadata extension map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value; objects, nulls and mixed arrays have no typed form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
            Value::Null | Value::Object(_) => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Snippet metadata: the fields every collection shares, plus a typed
/// extension map for collection-specific keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnippetMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, MetadataValue>,
}

impl SnippetMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn extra(&self, key: &str) -> Option<&MetadataValue> {
        self.extra.get(key)
    }

    /// Build from a loose JSON object as stored by document indexes.
    ///
    /// `source`, `category`, `date` (YYYY-MM-DD) and `tags` (list or
    /// comma-separated string) land in the fixed fields; everything else
    /// goes to the extension map. An unparseable date is kept as text.
    pub fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut metadata = Self::default();
        for (key, value) in map {
            match (key.as_str(), value) {
                ("source", serde_json::Value::String(s)) => metadata.source = Some(s.clone()),
                ("category", serde_json::Value::String(s)) => {
                    metadata.category = Some(s.clone())
                }
                ("date", serde_json::Value::String(s)) => {
                    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                        Ok(date) => metadata.date = Some(date),
                        Err(_) => {
                            metadata.extra.insert("date".to_string(), MetadataValue::Text(s.clone()));
                        }
                    }
                }
                ("tags", serde_json::Value::String(s)) => {
                    metadata.tags = split_tags(s);
                }
                ("tags", serde_json::Value::Array(items)) => {
                    metadata.tags = items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect();
                }
                _ => {
                    if let Some(typed) = MetadataValue::from_json(value) {
                        metadata.extra.insert(key.clone(), typed);
                    }
                }
            }
        }
        metadata
    }
}

/// Split a comma-separated tag string, dropping empty entries.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// A retrieved unit of content with its raw backend score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSnippet {
    pub id: String,
    pub collection: String,
    pub text: String,
    #[serde(default)]
    pub metadata: SnippetMetadata,
    /// Raw relevance score from the origin backend; higher is better.
    pub score: f32,
    pub origin: Origin,
}

impl CandidateSnippet {
    pub fn new(
        id: impl Into<String>,
        collection: impl Into<String>,
        text: impl Into<String>,
        origin: Origin,
        score: f32,
    ) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
            text: text.into(),
            metadata: SnippetMetadata::default(),
            score,
            origin,
        }
    }

    pub fn with_metadata(mut self, metadata: SnippetMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
#[path = "snippet_tests.rs"]
mod tests;
