//! Rows and row identifiers
//!
//! A row is a JSON object mapping column names to scalar values. Rows do not
//! carry an explicit identity, so [`resolve_row_id`] derives one with a fixed
//! fallback: the internal `rowid`, then the primary-key column, then the
//! row's position in the page. Resolution always succeeds.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One table row
pub type Row = serde_json::Map<String, Value>;

/// Column holding the storage engine's internal row id
pub const ROWID_COLUMN: &str = "rowid";

/// Primary-key column assumed when the schema declares none
pub const DEFAULT_PK_COLUMN: &str = "id";

/// Identifier used to address a row for update/delete
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl RowId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(RowId::Int)
                .or_else(|| Some(RowId::Text(n.to_string()))),
            Value::String(s) if !s.is_empty() => Some(RowId::Text(s.clone())),
            Value::Bool(b) => Some(RowId::Text(b.to_string())),
            _ => None,
        }
    }

    /// Literal form for embedding in a generated handler call
    ///
    /// Integers are emitted bare; text is single-quoted with `\` and `'`
    /// escaped, so `it's` becomes `'it\'s'`.
    pub fn handler_literal(&self) -> String {
        match self {
            RowId::Int(n) => n.to_string(),
            RowId::Text(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('\'');
                for c in s.chars() {
                    match c {
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        _ => out.push(c),
                    }
                }
                out.push('\'');
                out
            }
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RowId::Int(n) => Value::from(*n),
            RowId::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(n) => write!(f, "{}", n),
            RowId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowId {
    fn from(n: i64) -> Self {
        RowId::Int(n)
    }
}

impl From<i32> for RowId {
    fn from(n: i32) -> Self {
        RowId::Int(n.into())
    }
}

impl From<u32> for RowId {
    fn from(n: u32) -> Self {
        RowId::Int(n.into())
    }
}

impl From<&RowId> for RowId {
    fn from(id: &RowId) -> Self {
        id.clone()
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId::Text(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        RowId::Text(s)
    }
}

/// Resolve the identifier of `row`, found at `index` within its page
///
/// `pk_column` is the schema's primary key; `None` falls back to `id`.
pub fn resolve_row_id(row: &Row, pk_column: Option<&str>, index: usize) -> RowId {
    if let Some(id) = row.get(ROWID_COLUMN).and_then(RowId::from_value) {
        return id;
    }
    let pk = pk_column.unwrap_or(DEFAULT_PK_COLUMN);
    if let Some(id) = row.get(pk).and_then(RowId::from_value) {
        return id;
    }
    debug!("Row {} has no rowid or '{}' value, using its position", index, pk);
    RowId::Int(index as i64)
}

/// Display text of a cell
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "NULL".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_rowid_wins() {
        let r = row(json!({"rowid": 7, "id": 3, "name": "a"}));
        assert_eq!(resolve_row_id(&r, None, 0), RowId::Int(7));
    }

    #[test]
    fn test_pk_fallback() {
        let r = row(json!({"id": 3, "name": "a"}));
        assert_eq!(resolve_row_id(&r, None, 0), RowId::Int(3));

        let r = row(json!({"sku": "AB-1", "name": "a"}));
        assert_eq!(
            resolve_row_id(&r, Some("sku"), 0),
            RowId::Text("AB-1".into())
        );
    }

    #[test]
    fn test_index_fallback() {
        let r = row(json!({"name": "a"}));
        assert_eq!(resolve_row_id(&r, None, 4), RowId::Int(4));

        let r = row(json!({"rowid": null, "id": null}));
        assert_eq!(resolve_row_id(&r, None, 2), RowId::Int(2));
    }

    #[test]
    fn test_handler_literal_escaping() {
        assert_eq!(RowId::Int(12).handler_literal(), "12");
        assert_eq!(RowId::from("abc").handler_literal(), "'abc'");
        assert_eq!(RowId::from("it's").handler_literal(), r"'it\'s'");
        assert_eq!(RowId::from(r"a\b").handler_literal(), r"'a\\b'");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(None), "NULL");
        assert_eq!(cell_text(Some(&json!(null))), "NULL");
        assert_eq!(cell_text(Some(&json!("x"))), "x");
        assert_eq!(cell_text(Some(&json!(1.5))), "1.5");
        assert_eq!(cell_text(Some(&json!(true))), "true");
    }
}
