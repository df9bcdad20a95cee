//! Tool request types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A typed tool parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolParamValue {
    Flag(bool),
    Integer(i64),
    Date(NaiveDate),
    Text(String),
}

impl ToolParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ToolParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ToolParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolParamValue::Flag(b) => write!(f, "{}", b),
            ToolParamValue::Integer(i) => write!(f, "{}", i),
            ToolParamValue::Date(d) => write!(f, "{}", d),
            ToolParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ToolParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ToolParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ToolParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for ToolParamValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<NaiveDate> for ToolParamValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// A request for one external tool operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub params: BTreeMap<String, ToolParamValue>,
}

impl ToolRequest {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ToolParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&ToolParamValue> {
        self.params.get(key)
    }

    pub fn text_param(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(ToolParamValue::as_str)
    }
}
