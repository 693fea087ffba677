//! Result envelopes returned by every SDK operation
//!
//! The SDK path never surfaces `Err` to its callers. Instead each operation
//! resolves to an envelope in which exactly one of `data` and `error` is set.

use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::row::Row;

/// Uniform `{data, error}` wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }

    /// Fold an `ApiResult` into an envelope
    pub fn from_result(result: ApiResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Transform the payload, keeping any error as is
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            data: self.data.map(f),
            error: self.error,
        }
    }

    /// Transform the payload with a fallible conversion
    pub fn and_then<U>(self, f: impl FnOnce(T) -> ApiResult<U>) -> Envelope<U> {
        match (self.data, self.error) {
            (Some(data), None) => Envelope::from_result(f(data)),
            (_, Some(error)) => Envelope::err(error),
            (None, None) => Envelope::err("Empty response"),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(error),
            (Some(data), None) => Ok(data),
            (None, None) => Err("Empty response".to_string()),
        }
    }
}

/// Pagination block of a row query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// Result of a deferred row query
///
/// On success `data` holds the rows and `count`/`pagination` describe the
/// full result set; on failure only `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub data: Option<Vec<Row>>,
    pub error: Option<String>,
    pub count: u64,
    pub pagination: Option<Pagination>,
}

impl QueryResult {
    pub fn success(rows: Vec<Row>, count: u64, pagination: Pagination) -> Self {
        Self {
            data: Some(rows),
            error: None,
            count,
            pagination: Some(pagination),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
            count: 0,
            pagination: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn rows(&self) -> &[Row] {
        self.data.as_deref().unwrap_or_default()
    }
}
