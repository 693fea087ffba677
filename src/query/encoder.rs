//! Query state and its canonical query-string encoding
//!
//! Encoding order is fixed: `limit`, `offset`, `search`, `sort`, `order`
//! (unset fields skipped), then every predicate in insertion order as
//! `column<suffix>=<value>`. Values are percent-encoded, column names are
//! written as given, and repeated predicates on one column are all kept.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::operator::Operator;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// `desc` (any case) is descending, everything else ascending
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

impl From<&str> for SortDirection {
    fn from(s: &str) -> Self {
        SortDirection::parse(s)
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One filter condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Eq, value)
    }

    /// `column<suffix>=<encoded value>`
    pub fn encode(&self) -> String {
        format!(
            "{}{}={}",
            self.column,
            self.operator.suffix(),
            urlencoding::encode(&scalar_text(&self.value))
        )
    }
}

/// Text form of a scalar as it appears in the query string
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Accumulated filter/sort/pagination configuration of one read
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryState {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub search: Option<String>,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
    pub predicates: Vec<Predicate>,
}

impl QueryState {
    pub fn is_empty(&self) -> bool {
        *self == QueryState::default()
    }
}

/// Encode a query state into its query string (without the leading `?`)
pub fn encode(state: &QueryState) -> String {
    let mut pairs: Vec<String> = Vec::new();

    let mut push = |key: &str, value: &str| {
        pairs.push(format!("{}={}", key, urlencoding::encode(value)));
    };
    if let Some(limit) = state.limit {
        push("limit", &limit.to_string());
    }
    if let Some(offset) = state.offset {
        push("offset", &offset.to_string());
    }
    if let Some(search) = &state.search {
        push("search", search);
    }
    if let Some(sort) = &state.sort_column {
        push("sort", sort);
        push("order", state.sort_direction.as_str());
    }

    pairs.extend(state.predicates.iter().map(Predicate::encode));
    pairs.join("&")
}
