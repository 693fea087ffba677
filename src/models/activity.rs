//! Activity log records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filters and paging for the activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityQuery {
    pub page: u64,
    pub limit: u64,
    /// Exact action name, e.g. `INSERT_ROW`
    pub action: Option<String>,
    /// Case-insensitive substring of the table name
    pub table: Option<String>,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 25,
            action: None,
            table: None,
        }
    }
}

impl ActivityQuery {
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn query_string(&self) -> String {
        let mut pairs = vec![format!("page={}", self.page), format!("limit={}", self.limit)];
        if let Some(action) = &self.action {
            pairs.push(format!("action={}", urlencoding::encode(action)));
        }
        if let Some(table) = &self.table {
            pairs.push(format!("table={}", urlencoding::encode(table)));
        }
        pairs.join("&")
    }
}

/// One logged action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: u64,
    pub action: String,
    pub table_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        time_ago(self.created_at, now)
    }
}

/// One page of the activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPage {
    #[serde(default)]
    pub logs: Vec<ActivityEntry>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub page_size: u64,
    #[serde(default)]
    pub total_pages: u64,
}

/// Relative age: `Just now`, `5m ago`, `3h ago`, `2d ago`, then the date
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds();
    match seconds {
        s if s < 60 => "Just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 604_800 => format!("{}d ago", s / 86_400),
        _ => at.format("%b %d, %Y").to_string(),
    }
}
