//! Transport abstraction
//!
//! A transport performs a single HTTP exchange and reports either the raw
//! response (any status) or a failure to complete the exchange. It does not
//! interpret status codes or decode JSON; that is the job of the request
//! layer in [`crate::request`].
//!
//! - `ReqwestTransport`: default implementation on top of `reqwest` (feature `http`)

use async_trait::async_trait;
use serde_json::Value;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::ReqwestTransport;

/// HTTP methods used by the table API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing request, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Query string portion of the URL, without the leading `?`
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, q)| q)
    }
}

/// Raw response: status code and undecoded body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The exchange could not be completed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Trait for HTTP transports
///
/// Implementations must be shareable across builders, hence `Send + Sync`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single exchange
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_header_lookup() {
        let request = HttpRequest::new(Method::Get, "http://x/tables/?limit=5")
            .with_header("X-API-Key", "sk_1");
        assert_eq!(request.header("x-api-key"), Some("sk_1"));
        assert_eq!(request.query(), Some("limit=5"));
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(201, "{}").is_success());
        assert!(!HttpResponse::new(404, "{}").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
    }
}
