//! API key records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored API key; only its prefix is ever returned after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: u64,
    pub name: String,
    /// `sk_` plus the first characters of the key
    pub key_prefix: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Response to key creation
///
/// `key` is the full secret. The server returns it this once.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedApiKey {
    pub id: u64,
    pub name: String,
    pub key_prefix: String,
    pub key: String,
}

impl std::fmt::Debug for CreatedApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatedApiKey")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_never_used_key() {
        let key: ApiKey = serde_json::from_value(json!({
            "id": 4, "name": "ci", "key_prefix": "sk_a1b2c3d",
            "created_at": "2025-06-01T08:00:00.000001+00:00",
            "last_used_at": null, "is_active": false
        }))
        .unwrap();
        assert!(key.last_used_at.is_none());
        assert!(!key.is_active);
    }

    #[test]
    fn test_created_key_debug_hides_secret() {
        let created = CreatedApiKey {
            id: 1,
            name: "ci".into(),
            key_prefix: "sk_a1b2c3d".into(),
            key: "sk_a1b2c3d_secret_tail".into(),
        };
        assert!(!format!("{:?}", created).contains("secret_tail"));
    }
}
