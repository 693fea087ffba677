//! Core request primitive
//!
//! Every call to the API goes through [`Requester::request`]. The caller
//! picks an [`ErrorPolicy`] that decides what a failure looks like:
//!
//! - [`ReturnEnvelope`]: failures become `Envelope { data: None, error }`;
//!   used by the SDK surface, which never returns `Err`.
//! - [`Raise`]: failures are returned as `Err(ApiError)`; used by the table
//!   view, whose actions handle errors at the call site.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::HeaderProvider;
use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

/// Message used when a failed response carries no usable error text
pub const DEFAULT_ERROR_MESSAGE: &str = "Request failed";

/// Decides how a request outcome is handed to the caller
pub trait ErrorPolicy {
    type Output;

    fn settle(result: ApiResult<Value>) -> Self::Output;
}

/// Recover every failure into the envelope
#[derive(Debug, Clone, Copy)]
pub struct ReturnEnvelope;

impl ErrorPolicy for ReturnEnvelope {
    type Output = Envelope<Value>;

    fn settle(result: ApiResult<Value>) -> Self::Output {
        Envelope::from_result(result)
    }
}

/// Hand failures back as `Err`
#[derive(Debug, Clone, Copy)]
pub struct Raise;

impl ErrorPolicy for Raise {
    type Output = ApiResult<Value>;

    fn settle(result: ApiResult<Value>) -> Self::Output {
        result
    }
}

/// Immutable endpoint + credentials + transport shared by a client and its builders
pub struct Requester {
    base_url: String,
    auth: Arc<dyn HeaderProvider>,
    transport: Arc<dyn Transport>,
}

impl Requester {
    pub fn new(
        base_url: impl AsRef<str>,
        auth: Arc<dyn HeaderProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: crate::config::normalize_base_url(base_url.as_ref()),
            auth,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and settle the outcome with policy `P`
    pub async fn request<P: ErrorPolicy>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> P::Output {
        P::settle(self.dispatch(method, path, body).await)
    }

    /// Send one request and return the body text of a 2xx response
    ///
    /// For endpoints that answer with something other than JSON (CSV exports).
    pub async fn request_text(&self, method: Method, path: &str) -> ApiResult<String> {
        let response = self.exchange(method, path, None).await?;
        self.checked(method, path, response)
    }

    async fn dispatch(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
        let response = self.exchange(method, path, body).await?;
        let body = self.checked(method, path, response)?;
        decode_body(&body)
    }

    async fn exchange(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<HttpResponse> {
        let mut request = HttpRequest::new(method, format!("{}{}", self.base_url, path))
            .with_header("Accept", "application/json");
        for (name, value) in self.auth.headers() {
            request = request.with_header(name, value);
        }
        if let Some(body) = body {
            request = request.with_body(body);
        }

        debug!("{} {}", method, request.url);
        self.transport.send(request).await.map_err(|e| {
            warn!("{} {} failed: {}", method, path, e);
            ApiError::from(e)
        })
    }

    fn checked(&self, method: Method, path: &str, response: HttpResponse) -> ApiResult<String> {
        check_status(response).inspect_err(|e| {
            if let ApiError::Http { status, .. } = e {
                warn!("{} {} returned {}: {}", method, path, status, e);
            }
        })
    }
}

/// Classify a raw response and decode its JSON body
///
/// An empty 2xx body decodes to `null` (some DELETE endpoints answer 204).
pub fn decode_response(response: HttpResponse) -> ApiResult<Value> {
    decode_body(&check_status(response)?)
}

/// Body text of a 2xx response, or the server's error message
pub fn check_status(response: HttpResponse) -> ApiResult<String> {
    if !response.is_success() {
        let message = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|body| error_message(&body))
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
        return Err(ApiError::Http {
            status: response.status,
            message,
        });
    }
    Ok(response.body)
}

fn decode_body(body: &str) -> ApiResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

/// Pull a human-readable message out of an error body: `error`, then `detail`
fn error_message(body: &Value) -> Option<String> {
    ["error", "detail"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|value| match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

/// Percent-encode one path segment (table names, row ids)
pub fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
