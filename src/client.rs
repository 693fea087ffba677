//! Client facade
//!
//! A [`Client`] holds the immutable endpoint, credentials and transport.
//! It hands out fresh [`QueryBuilder`]s and owns the whole-table operations.
//!
//! Two consumers, two error policies:
//!
//! - SDK methods on `Client` and `QueryBuilder` always resolve to an
//!   envelope and never return `Err`.
//! - [`RawClient`] (from [`Client::raw`]) returns `Err(ApiError)` on any
//!   failure; the table view uses it for its row actions.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::info;

use crate::auth::{ApiKeyAuth, CsrfCookieAuth, HeaderProvider, NoAuth};
use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ActivityPage, ActivityQuery, ApiKey, CreatedApiKey, ExportData, ExportFormat, ImportSummary,
    Stats, TableInfo,
};
use crate::query::QueryBuilder;
use crate::request::{Raise, Requester, ReturnEnvelope, segment};
use crate::row::Row;
use crate::schema::{SchemaSpec, TableSchema};
use crate::transport::{Method, Transport};

/// Entry point of the SDK
#[derive(Clone)]
pub struct Client {
    requester: Arc<Requester>,
}

impl Client {
    /// Client authenticated with an API key, using the default HTTP transport
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use tablekit_sdk::Client;
    ///
    /// let client = Client::new("https://tables.example.com/api/v1/", "sk_live_123");
    /// let products = client.from("products");
    /// ```
    #[cfg(feature = "http")]
    pub fn new(base_url: impl AsRef<str>, api_key: impl Into<String>) -> Self {
        Self::with_transport(
            base_url,
            ApiKeyAuth::new(api_key),
            Arc::new(crate::transport::ReqwestTransport::new()),
        )
    }

    /// Client built from a [`ClientConfig`]
    #[cfg(feature = "http")]
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        let transport = crate::transport::ReqwestTransport::from_config(config)
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self::from_config_with_transport(config, Arc::new(transport)))
    }

    /// Same-origin dashboard client authenticated by the CSRF cookie
    #[cfg(feature = "http")]
    pub fn dashboard(base_url: impl AsRef<str>, auth: CsrfCookieAuth) -> Self {
        Self::with_transport(
            base_url,
            auth,
            Arc::new(crate::transport::ReqwestTransport::new()),
        )
    }

    /// Client over a caller-supplied transport
    pub fn with_transport(
        base_url: impl AsRef<str>,
        auth: impl HeaderProvider + 'static,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            requester: Arc::new(Requester::new(base_url, Arc::new(auth), transport)),
        }
    }

    pub fn from_config_with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        match &config.api_key {
            Some(key) => Self::with_transport(&config.base_url, ApiKeyAuth::new(key.clone()), transport),
            None => Self::with_transport(&config.base_url, NoAuth, transport),
        }
    }

    /// Normalized base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        self.requester.base_url()
    }

    /// Fresh query builder for `table`
    pub fn from(&self, table: impl Into<String>) -> QueryBuilder {
        QueryBuilder::new(self.requester.clone(), table)
    }

    /// Request helper that raises instead of returning envelopes
    pub fn raw(&self) -> RawClient {
        RawClient {
            requester: self.requester.clone(),
        }
    }

    /// List all tables
    ///
    /// Accepts both `{tables: [...]}` and a bare array.
    pub async fn tables(&self) -> Envelope<Vec<TableInfo>> {
        self.send(Method::Get, "/tables/", None)
            .await
            .and_then(|body| {
                let list = match body {
                    Value::Object(mut map) => map.remove("tables").unwrap_or(Value::Null),
                    other => other,
                };
                serde_json::from_value(list).map_err(ApiError::from)
            })
    }

    /// Create a table from a column list or a name -> type mapping
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use tablekit_sdk::{Client, schema::Column};
    /// # async fn example(client: Client) {
    /// // ordered mapping
    /// client.create_table("notes", [("title", "TEXT"), ("stars", "INTEGER")]).await;
    ///
    /// // full definitions
    /// client
    ///     .create_table("users", vec![
    ///         Column::new("id", "INTEGER").primary_key(),
    ///         Column::new("email", "TEXT").not_null().unique(),
    ///     ])
    ///     .await;
    /// # }
    /// ```
    pub async fn create_table(
        &self,
        name: impl Into<String>,
        schema: impl Into<SchemaSpec>,
    ) -> Envelope<Value> {
        let name = name.into();
        if name.trim().is_empty() {
            return Envelope::err("Table name is required");
        }
        let columns = schema.into().into_columns();
        info!("Creating table '{}' with {} columns", name, columns.len());
        let body = json!({ "name": name, "columns": columns });
        self.send(Method::Post, "/tables/", Some(body)).await
    }

    /// Drop a table
    pub async fn drop_table(&self, name: &str) -> Envelope<Value> {
        if name.trim().is_empty() {
            return Envelope::err("No table selected");
        }
        self.send(Method::Delete, &format!("/tables/{}/", segment(name)), None)
            .await
    }

    /// Bulk-insert rows into a table
    pub async fn import_rows(&self, name: &str, rows: Vec<Row>) -> Envelope<ImportSummary> {
        if name.trim().is_empty() {
            return Envelope::err("No table selected");
        }
        if rows.is_empty() {
            return Envelope::err("No data provided");
        }
        let body = json!({ "format": "json", "data": rows });
        self.send(
            Method::Post,
            &format!("/tables/{}/import/", segment(name)),
            Some(body),
        )
        .await
        .and_then(|body| serde_json::from_value(body).map_err(ApiError::from))
    }

    /// Dashboard statistics
    pub async fn stats(&self) -> Envelope<Stats> {
        self.send(Method::Get, "/stats/", None)
            .await
            .and_then(|body| serde_json::from_value(body).map_err(ApiError::from))
    }

    /// One page of the activity log
    pub async fn activity(&self, query: &ActivityQuery) -> Envelope<ActivityPage> {
        self.send(
            Method::Get,
            &format!("/activity/?{}", query.query_string()),
            None,
        )
        .await
        .and_then(|body| serde_json::from_value(body).map_err(ApiError::from))
    }

    /// Export a whole table as JSON or CSV
    pub async fn export_table(&self, name: &str, format: ExportFormat) -> Envelope<ExportData> {
        if name.trim().is_empty() {
            return Envelope::err("No table selected");
        }
        let path = format!("/tables/{}/export/?format={}", segment(name), format);
        info!("Exporting table '{}' as {}", name, format);
        match format {
            ExportFormat::Json => self
                .send(Method::Get, &path, None)
                .await
                .and_then(|body| Ok(ExportData::Json(serde_json::from_value(body)?))),
            ExportFormat::Csv => Envelope::from_result(
                self.requester
                    .request_text(Method::Get, &path)
                    .await
                    .map(ExportData::Csv),
            ),
        }
    }

    /// API keys of the signed-in user
    pub async fn api_keys(&self) -> Envelope<Vec<ApiKey>> {
        self.send(Method::Get, "/keys/", None)
            .await
            .and_then(|body| {
                let keys = match body {
                    Value::Object(mut map) => map.remove("keys").unwrap_or(Value::Null),
                    other => other,
                };
                serde_json::from_value(keys).map_err(ApiError::from)
            })
    }

    /// Create an API key; the returned secret is not retrievable later
    pub async fn create_api_key(&self, name: &str) -> Envelope<CreatedApiKey> {
        let name = name.trim();
        if name.is_empty() {
            return Envelope::err("Key name is required");
        }
        self.send(Method::Post, "/keys/", Some(json!({ "name": name })))
            .await
            .and_then(|body| serde_json::from_value(body).map_err(ApiError::from))
    }

    pub async fn delete_api_key(&self, id: u64) -> Envelope<Value> {
        self.send(Method::Delete, &format!("/keys/{}/", id), None)
            .await
    }

    /// Activate or deactivate an API key
    pub async fn set_api_key_active(&self, id: u64, active: bool) -> Envelope<Value> {
        self.send(
            Method::Patch,
            &format!("/keys/{}/", id),
            Some(json!({ "is_active": active })),
        )
        .await
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Envelope<Value> {
        self.requester
            .request::<ReturnEnvelope>(method, path, body)
            .await
    }
}

/// Request helper with the raising error policy
#[derive(Clone)]
pub struct RawClient {
    requester: Arc<Requester>,
}

impl RawClient {
    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.requester.request::<Raise>(Method::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.requester
            .request::<Raise>(Method::Post, path, Some(body))
            .await
    }

    pub async fn put(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.requester
            .request::<Raise>(Method::Put, path, Some(body))
            .await
    }

    pub async fn delete(&self, path: &str, body: Option<Value>) -> ApiResult<Value> {
        self.requester
            .request::<Raise>(Method::Delete, path, body)
            .await
    }

    /// Dashboard schema endpoint (`GET /tables/{name}/schema/`)
    pub async fn table_schema(&self, table: &str) -> ApiResult<TableSchema> {
        let body = self
            .get(&format!("/tables/{}/schema/", segment(table)))
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}
