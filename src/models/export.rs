//! Table exports

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::row::Row;
use crate::schema::Column;

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full JSON dump of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableExport {
    pub table_name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub row_count: u64,
    pub exported_at: DateTime<Utc>,
}

/// Exported table in the requested format
#[derive(Debug, Clone, PartialEq)]
pub enum ExportData {
    Json(TableExport),
    /// CSV text, header line first
    Csv(String),
}

impl ExportData {
    pub fn format(&self) -> ExportFormat {
        match self {
            ExportData::Json(_) => ExportFormat::Json,
            ExportData::Csv(_) => ExportFormat::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_export_decodes() {
        let export: TableExport = serde_json::from_value(json!({
            "table_name": "orders",
            "columns": [{"name": "id", "type": "INTEGER", "pk": true}, {"name": "note", "type": "TEXT"}],
            "rows": [{"id": 1, "note": null}],
            "row_count": 1,
            "exported_at": "2025-06-15T12:00:00.5+00:00"
        }))
        .unwrap();
        assert_eq!(export.columns[0].name, "id");
        assert!(export.columns[0].pk);
        assert_eq!(export.rows.len(), 1);
        assert_eq!(ExportData::Json(export).format(), ExportFormat::Json);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::default().as_str(), "json");
        assert_eq!(ExportFormat::Csv.to_string(), "csv");
    }
}
