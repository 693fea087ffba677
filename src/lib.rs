//! TableKit SDK - Client library for the TableKit table API
//!
//! Provides:
//! - A deferred, chainable query builder that compiles to one wire query
//! - A client facade for tables, rows, columns, imports, stats and activity
//! - A table view controller with pagination, sorting, filtering, debounced
//!   search and a stale-response guard
//! - Pluggable transports and auth header providers

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod models;
pub mod query;
pub mod request;
pub mod row;
pub mod schema;
pub mod transport;
pub mod view;

// Re-export commonly used types
pub use client::{Client, RawClient};
pub use config::{ClientConfig, ViewConfig};
pub use envelope::{Envelope, Pagination, QueryResult};
pub use error::{ApiError, ApiResult};
pub use query::{Operator, Predicate, QueryBuilder, SortDirection};
pub use row::{Row, RowId};
pub use schema::{Column, InputKind, SchemaSpec, TableSchema};

pub use auth::{ApiKeyAuth, CsrfCookieAuth, HeaderProvider, NoAuth};
#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
pub use transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};

pub use models::{
    ActivityEntry, ActivityPage, ActivityQuery, ApiKey, CreatedApiKey, ExportData, ExportFormat,
    ImportSummary, Stats, TableExport, TableInfo,
};
pub use view::{Render, TableView, ViewPhase};
