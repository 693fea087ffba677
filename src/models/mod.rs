//! Records returned by the table API
//!
//! Table listings, dashboard statistics, import summaries, exports, API keys
//! and activity logs.
//! Row data and schemas live in [`crate::row`] and [`crate::schema`].

pub mod activity;
pub mod api_key;
pub mod export;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use activity::{ActivityEntry, ActivityPage, ActivityQuery, time_ago};
pub use api_key::{ApiKey, CreatedApiKey};
pub use export::{ExportData, ExportFormat, TableExport};

/// One entry of the table listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Dashboard statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total_tables: u64,
    #[serde(default)]
    pub total_rows: u64,
    #[serde(default)]
    pub database_size: u64,
    #[serde(default)]
    pub actions_today: u64,
}

/// Outcome of a bulk row import
///
/// The server reports at most ten error messages; `total_errors` is the full count.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    #[serde(default)]
    pub imported: u64,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub total_errors: u64,
}

impl ImportSummary {
    pub fn is_clean(&self) -> bool {
        self.total_errors == 0
    }
}
