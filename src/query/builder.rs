//! Deferred query builder
//!
//! A [`QueryBuilder`] accumulates predicates, sort order, pagination and
//! search across chained calls. Nothing is sent until the builder is executed
//! (or awaited). Every execution encodes the state as it is at that moment;
//! later chaining never affects a request that was already issued.
//!
//! # Example
//!
//! ```rust,no_run
//! # use tablekit_sdk::Client;
//! # async fn example(client: Client) {
//! let result = client
//!     .from("products")
//!     .where_op("price", "gte", 10)
//!     .where_("category", "shoes")
//!     .order_by("price", "desc")
//!     .limit(20)
//!     .await;
//!
//! for row in result.rows() {
//!     println!("{:?}", row);
//! }
//! # }
//! ```

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::encoder::{Predicate, QueryState, SortDirection, encode};
use super::operator::Operator;
use crate::envelope::{Envelope, Pagination, QueryResult};
use crate::error::{ApiError, ApiResult};
use crate::request::{ReturnEnvelope, Requester, segment};
use crate::row::{Row, RowId};
use crate::schema::TableSchema;
use crate::transport::Method;

/// Chainable, deferred query against one table
pub struct QueryBuilder {
    requester: Arc<Requester>,
    table: String,
    state: QueryState,
}

impl QueryBuilder {
    pub(crate) fn new(requester: Arc<Requester>, table: impl Into<String>) -> Self {
        Self {
            requester,
            table: table.into(),
            state: QueryState::default(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Query string the next execution would send
    pub fn query_string(&self) -> String {
        encode(&self.state)
    }

    /// Add an equality predicate
    pub fn where_(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.where_op(column, Operator::Eq, value)
    }

    /// Add a predicate with an explicit operator (`"gt"`, `"ILIKE"`, `Operator::Lte`, ...)
    pub fn where_op(
        &mut self,
        column: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.state
            .predicates
            .push(Predicate::new(column, operator.into(), value));
        self
    }

    /// Append an already-built predicate
    pub fn filter(&mut self, predicate: Predicate) -> &mut Self {
        self.state.predicates.push(predicate);
        self
    }

    /// Set the sort column and direction, replacing any previous sort
    pub fn order_by(
        &mut self,
        column: impl Into<String>,
        direction: impl Into<SortDirection>,
    ) -> &mut Self {
        self.state.sort_column = Some(column.into());
        self.state.sort_direction = direction.into();
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.state.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.state.offset = Some(offset);
        self
    }

    /// Free-text search across all columns
    pub fn search(&mut self, text: impl Into<String>) -> &mut Self {
        self.state.search = Some(text.into());
        self
    }

    /// Read entry point; `Some(n)` is the same as `limit(n)`
    ///
    /// Does not execute anything by itself.
    pub fn select(&mut self, limit: Option<u64>) -> &mut Self {
        if let Some(limit) = limit {
            self.limit(limit);
        }
        self
    }

    /// Snapshot the current state into a request that can be sent later
    pub fn prepare(&self) -> PreparedQuery {
        let path = self.rows_path().map(|base| {
            let query = encode(&self.state);
            if query.is_empty() {
                base
            } else {
                format!("{}?{}", base, query)
            }
        });
        PreparedQuery {
            requester: self.requester.clone(),
            path,
            fallback_page_size: self.state.limit,
        }
    }

    /// Run the read with the current state
    ///
    /// May be called any number of times; each call is an independent request.
    pub async fn execute(&self) -> QueryResult {
        self.prepare().send().await
    }

    /// Insert one row
    pub async fn insert(&self, data: Value) -> Envelope<Value> {
        match self.rows_path() {
            Ok(path) => self.send(Method::Post, &path, Some(data)).await,
            Err(e) => Envelope::err(e.to_string()),
        }
    }

    /// Update the row addressed by `id`
    pub async fn update(&self, id: impl Into<RowId>, data: Value) -> Envelope<Value> {
        match self.row_path(&id.into()) {
            Ok(path) => self.send(Method::Put, &path, Some(data)).await,
            Err(e) => Envelope::err(e.to_string()),
        }
    }

    /// Delete the row addressed by `id`
    pub async fn delete(&self, id: impl Into<RowId>) -> Envelope<Value> {
        match self.row_path(&id.into()) {
            Ok(path) => self.send(Method::Delete, &path, None).await,
            Err(e) => Envelope::err(e.to_string()),
        }
    }

    /// Fetch a single row, unwrapping `{row: {...}}`
    pub async fn get(&self, id: impl Into<RowId>) -> Envelope<Row> {
        let envelope = match self.row_path(&id.into()) {
            Ok(path) => self.send(Method::Get, &path, None).await,
            Err(e) => return Envelope::err(e.to_string()),
        };
        envelope.and_then(|body| {
            let row = body.get("row").cloned().unwrap_or(body);
            match row {
                Value::Object(map) => Ok(map),
                other => Err(ApiError::Decode(format!("expected a row object, got {}", other))),
            }
        })
    }

    pub async fn add_column(
        &self,
        name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Envelope<Value> {
        let body = json!({ "name": name.into(), "type": data_type.into() });
        self.columns_request(Method::Post, body).await
    }

    pub async fn rename_column(
        &self,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Envelope<Value> {
        let body = json!({ "old_name": old_name.into(), "new_name": new_name.into() });
        self.columns_request(Method::Put, body).await
    }

    pub async fn delete_column(&self, name: impl Into<String>) -> Envelope<Value> {
        let body = json!({ "name": name.into() });
        self.columns_request(Method::Delete, body).await
    }

    /// Raw table description (`GET /tables/{name}/`)
    pub async fn schema(&self) -> Envelope<Value> {
        match self.table_path() {
            Ok(path) => self.send(Method::Get, &path, None).await,
            Err(e) => Envelope::err(e.to_string()),
        }
    }

    /// Table description decoded into a [`TableSchema`]
    pub async fn table_schema(&self) -> Envelope<TableSchema> {
        self.schema()
            .await
            .and_then(|body| serde_json::from_value(body).map_err(ApiError::from))
    }

    async fn columns_request(&self, method: Method, body: Value) -> Envelope<Value> {
        match self.table_path() {
            Ok(path) => {
                self.send(method, &format!("{}columns/", path), Some(body))
                    .await
            }
            Err(e) => Envelope::err(e.to_string()),
        }
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Envelope<Value> {
        self.requester
            .request::<ReturnEnvelope>(method, path, body)
            .await
    }

    fn table_path(&self) -> ApiResult<String> {
        if self.table.trim().is_empty() {
            return Err(ApiError::MissingState("No table selected".to_string()));
        }
        Ok(format!("/tables/{}/", segment(&self.table)))
    }

    fn rows_path(&self) -> ApiResult<String> {
        Ok(format!("{}rows/", self.table_path()?))
    }

    fn row_path(&self, id: &RowId) -> ApiResult<String> {
        let id = id.to_string();
        if id.is_empty() {
            return Err(ApiError::MissingState("No row id given".to_string()));
        }
        Ok(format!("{}{}/", self.rows_path()?, segment(&id)))
    }
}

/// A read whose query string was fixed when it was prepared
pub struct PreparedQuery {
    requester: Arc<Requester>,
    path: ApiResult<String>,
    fallback_page_size: Option<u64>,
}

impl PreparedQuery {
    /// Path and query string this request targets
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref().ok()
    }

    pub async fn send(self) -> QueryResult {
        let path = match self.path {
            Ok(path) => path,
            Err(e) => return QueryResult::failure(e.to_string()),
        };
        debug!("Executing query {}", path);
        let envelope = self
            .requester
            .request::<ReturnEnvelope>(Method::Get, &path, None)
            .await;
        translate_rows(envelope, self.fallback_page_size)
    }
}

#[derive(Debug, Deserialize)]
struct RowsPayload {
    #[serde(default)]
    rows: Vec<Row>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    page: Option<u64>,
    #[serde(default, alias = "limit")]
    page_size: Option<u64>,
    #[serde(default)]
    total_pages: Option<u64>,
}

/// Map a raw row-list envelope onto the public result shape
fn translate_rows(envelope: Envelope<Value>, fallback_page_size: Option<u64>) -> QueryResult {
    let body = match envelope.into_result() {
        Ok(body) => body,
        Err(error) => return QueryResult::failure(error),
    };
    let payload: RowsPayload = match serde_json::from_value(body) {
        Ok(payload) => payload,
        Err(e) => return QueryResult::failure(ApiError::from(e).to_string()),
    };

    let count = payload.total.unwrap_or(payload.rows.len() as u64);
    let limit = payload
        .page_size
        .or(fallback_page_size)
        .unwrap_or(payload.rows.len() as u64);
    let total_pages = payload
        .total_pages
        .unwrap_or_else(|| total_pages(count, limit));
    let pagination = Pagination {
        page: payload.page.unwrap_or(1),
        limit,
        total_pages,
    };
    QueryResult::success(payload.rows, count, pagination)
}

/// `ceil(total / page_size)`, zero when the page size is zero
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

type QueryFuture = Pin<Box<dyn Future<Output = QueryResult> + Send>>;

impl IntoFuture for &QueryBuilder {
    type Output = QueryResult;
    type IntoFuture = QueryFuture;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.prepare().send())
    }
}

impl IntoFuture for &mut QueryBuilder {
    type Output = QueryResult;
    type IntoFuture = QueryFuture;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.prepare().send())
    }
}

impl IntoFuture for QueryBuilder {
    type Output = QueryResult;
    type IntoFuture = QueryFuture;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.prepare().send())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoAuth;
    use crate::transport::HttpResponse;
    use crate::transport::mock::MockTransport;

    fn builder(transport: Arc<MockTransport>, table: &str) -> QueryBuilder {
        let requester = Arc::new(Requester::new("http://h/api/v1", Arc::new(NoAuth), transport));
        QueryBuilder::new(requester, table)
    }

    fn rows_body() -> Value {
        json!({
            "rows": [{"rowid": 1, "name": "a"}, {"rowid": 2, "name": "b"}],
            "total": 12, "page": 2, "page_size": 2, "total_pages": 6
        })
    }

    #[test]
    fn test_mutators_return_same_instance() {
        let transport = Arc::new(MockTransport::json(200, rows_body()));
        let mut b = builder(transport, "products");
        let original: *const QueryBuilder = &b;
        let chained: *const QueryBuilder = b.where_("a", 1).order_by("a", "desc").limit(5);
        assert!(std::ptr::eq(original, chained));
    }

    #[test]
    fn test_scalars_overwrite_predicates_append() {
        let transport = Arc::new(MockTransport::json(200, rows_body()));
        let mut b = builder(transport, "products");
        b.order_by("name", "asc")
            .order_by("price", "DESC")
            .limit(5)
            .limit(10)
            .where_("a", 1)
            .where_op("a", "GT", 2);
        assert_eq!(b.state().sort_column.as_deref(), Some("price"));
        assert_eq!(b.state().predicates.len(), 2);
        assert_eq!(b.query_string(), "limit=10&sort=price&order=desc&a=1&a__gt=2");
    }

    #[test]
    fn test_select_sets_limit_only_when_given() {
        let transport = Arc::new(MockTransport::json(200, rows_body()));
        let mut b = builder(transport, "t");
        b.select(None);
        assert_eq!(b.state().limit, None);
        b.select(Some(3));
        assert_eq!(b.state().limit, Some(3));
    }

    #[tokio::test]
    async fn test_nothing_sent_until_executed() {
        let transport = Arc::new(MockTransport::json(200, rows_body()));
        let mut b = builder(transport.clone(), "products");
        b.where_("a", 1).select(Some(2));
        assert!(transport.requests().is_empty());

        let result = b.execute().await;
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(
            transport.requests()[0].url,
            "http://h/api/v1/tables/products/rows/?limit=2&a=1"
        );
        assert_eq!(result.count, 12);
        assert_eq!(
            result.pagination,
            Some(Pagination {
                page: 2,
                limit: 2,
                total_pages: 6
            })
        );
        assert_eq!(result.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_execute_twice_sends_identical_queries() {
        let transport = Arc::new(MockTransport::json(200, rows_body()));
        let mut b = builder(transport.clone(), "products");
        b.where_op("price", "lte", 9.5).search("x y");
        b.execute().await;
        b.execute().await;
        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].url, sent[1].url);
    }

    #[tokio::test]
    async fn test_prepared_query_ignores_later_mutation() {
        let transport = Arc::new(MockTransport::json(200, rows_body()));
        let mut b = builder(transport.clone(), "products");
        b.limit(5);
        let prepared = b.prepare();
        b.limit(50).where_("late", true);
        prepared.send().await;
        assert_eq!(
            transport.requests()[0].query(),
            Some("limit=5")
        );
        assert_eq!(b.query_string(), "limit=50&late=true");
    }

    #[tokio::test]
    async fn test_awaiting_builder() {
        let transport = Arc::new(MockTransport::json(200, rows_body()));
        let mut b = builder(transport.clone(), "products");
        let first = b.limit(2).await;
        let second = (&b).await;
        assert!(first.is_ok() && second.is_ok());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_passes_error_through() {
        let transport = Arc::new(MockTransport::json(404, json!({"error": "Table not found"})));
        let result = builder(transport, "missing").execute().await;
        assert!(result.data.is_none());
        assert_eq!(result.error.as_deref(), Some("Table not found"));
    }

    #[tokio::test]
    async fn test_missing_table_sends_nothing() {
        let transport = Arc::new(MockTransport::json(200, rows_body()));
        let b = builder(transport.clone(), "");
        let result = b.execute().await;
        assert_eq!(result.error.as_deref(), Some("No table selected"));
        let envelope = b.insert(json!({"a": 1})).await;
        assert_eq!(envelope.error.as_deref(), Some("No table selected"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_lenient_row_payload() {
        let transport = Arc::new(MockTransport::json(
            200,
            json!({"rows": [{"id": 1}], "total": 51, "page": 1, "limit": 25}),
        ));
        let result = builder(transport, "t").execute().await;
        let pagination = result.pagination.unwrap();
        assert_eq!(pagination.limit, 25);
        assert_eq!(pagination.total_pages, 3);
    }

    #[tokio::test]
    async fn test_immediate_verbs_ignore_query_state() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(HttpResponse::new(200, r#"{"success":true}"#))
        }));
        let mut b = builder(transport.clone(), "products");
        b.where_("a", 1).limit(3);

        b.insert(json!({"name": "x"})).await;
        b.update(7, json!({"name": "y"})).await;
        b.delete("sku-1").await;
        b.add_column("stock", "INTEGER").await;
        b.rename_column("stock", "qty").await;
        b.delete_column("qty").await;
        b.schema().await;

        let sent = transport.requests();
        let summary: Vec<(Method, &str)> = sent
            .iter()
            .map(|r| (r.method, r.url.trim_start_matches("http://h/api/v1")))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Method::Post, "/tables/products/rows/"),
                (Method::Put, "/tables/products/rows/7/"),
                (Method::Delete, "/tables/products/rows/sku-1/"),
                (Method::Post, "/tables/products/columns/"),
                (Method::Put, "/tables/products/columns/"),
                (Method::Delete, "/tables/products/columns/"),
                (Method::Get, "/tables/products/"),
            ]
        );
        assert_eq!(sent[4].body, Some(json!({"old_name": "stock", "new_name": "qty"})));
        assert!(sent.iter().all(|r| r.query().is_none()));
    }

    #[tokio::test]
    async fn test_get_unwraps_row() {
        let transport = Arc::new(MockTransport::json(
            200,
            json!({"success": true, "row": {"rowid": 4, "name": "z"}}),
        ));
        let row = builder(transport, "t").get(4).await.data.unwrap();
        assert_eq!(row.get("name"), Some(&json!("z")));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 25), 0);
        assert_eq!(total_pages(25, 25), 1);
        assert_eq!(total_pages(26, 25), 2);
        assert_eq!(total_pages(10, 0), 0);
    }
}
