//! Table schema model
//!
//! Columns are kept in declaration order, which is also display order.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Column definition as stored by the server and sent on table creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", default = "default_column_type")]
    pub data_type: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub pk: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub notnull: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub unique: bool,
}

fn default_column_type() -> String {
    "TEXT".to_string()
}

/// The server treats `true`, `"true"`, `"True"`, `1` and `"1"` as set
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.as_str(), "true" | "True" | "1"),
        _ => false,
    })
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            pk: false,
            notnull: false,
            unique: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.pk = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.notnull = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Integer primary keys are auto-incremented by the server
    pub fn is_auto_increment(&self) -> bool {
        self.pk && self.data_type.eq_ignore_ascii_case("INTEGER")
    }

    pub fn input_kind(&self) -> InputKind {
        InputKind::for_type(&self.data_type)
    }
}

/// Schema of one table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(alias = "table_name", default)]
    pub name: String,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.columns.iter().find(|c| c.pk).map(|c| c.name.as_str())
    }
}

/// Column definitions for `create_table`
///
/// Either a full ordered list of column definitions or a plain
/// name -> type mapping; the mapping is normalized into the list with its
/// insertion order kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSpec {
    Columns(Vec<Column>),
    Types(IndexMap<String, String>),
}

impl SchemaSpec {
    pub fn into_columns(self) -> Vec<Column> {
        match self {
            SchemaSpec::Columns(columns) => columns,
            SchemaSpec::Types(types) => types
                .into_iter()
                .map(|(name, data_type)| Column::new(name, data_type))
                .collect(),
        }
    }
}

impl From<Vec<Column>> for SchemaSpec {
    fn from(columns: Vec<Column>) -> Self {
        SchemaSpec::Columns(columns)
    }
}

impl From<IndexMap<String, String>> for SchemaSpec {
    fn from(types: IndexMap<String, String>) -> Self {
        SchemaSpec::Types(types)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for SchemaSpec {
    fn from(pairs: [(K, V); N]) -> Self {
        SchemaSpec::Types(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Form input used to edit a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Number,
    Checkbox,
    Date,
    Textarea,
    Text,
}

impl InputKind {
    /// Map a declared column type onto an input kind
    ///
    /// Matching is case-insensitive and by substring, so `BIGINT` is a
    /// number and `DATETIME` stays plain text.
    pub fn for_type(data_type: &str) -> Self {
        let t = data_type.to_ascii_uppercase();
        if t.contains("INT") {
            InputKind::Number
        } else if t.contains("BOOL") {
            InputKind::Checkbox
        } else if t.contains("DATE") && !t.contains("TIME") {
            InputKind::Date
        } else if t.contains("TEXT") || t.contains("BLOB") {
            InputKind::Textarea
        } else {
            InputKind::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Number => "number",
            InputKind::Checkbox => "checkbox",
            InputKind::Date => "date",
            InputKind::Textarea => "textarea",
            InputKind::Text => "text",
        }
    }

    /// Convert raw form input into the JSON value sent to the server
    ///
    /// Empty input becomes `null`; numbers that do not parse are sent as text
    /// and left for the server to reject.
    pub fn coerce(&self, raw: &str) -> Value {
        let trimmed = raw.trim();
        match self {
            InputKind::Checkbox => Value::Bool(matches!(
                trimmed.to_ascii_lowercase().as_str(),
                "true" | "on" | "1" | "yes"
            )),
            _ if trimmed.is_empty() => Value::Null,
            InputKind::Number => {
                if let Ok(n) = trimmed.parse::<i64>() {
                    Value::from(n)
                } else if let Some(n) = trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                {
                    Value::Number(n)
                } else {
                    Value::from(raw)
                }
            }
            _ => Value::from(raw),
        }
    }
}

/// One field of the insert/edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub kind: InputKind,
    pub required: bool,
}

/// Form fields for inserting a row; auto-increment keys are left to the server
pub fn insert_form_fields(schema: &TableSchema) -> Vec<FormField> {
    schema
        .columns
        .iter()
        .filter(|c| !c.is_auto_increment())
        .map(|c| FormField {
            name: c.name.clone(),
            kind: c.input_kind(),
            required: c.notnull || c.pk,
        })
        .collect()
}
