//! Scripted in-memory transport shared by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tablekit_sdk::auth::NoAuth;
use tablekit_sdk::{Client, HttpRequest, HttpResponse, Transport, TransportError};

/// Canned answer to one request
pub enum Reply {
    Body { status: u16, body: String, delay: Duration },
    Fail(String),
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self::text(status, body.to_string())
    }

    /// Raw, non-JSON body such as a CSV export
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Reply::Body {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn fail(message: &str) -> Self {
        Reply::Fail(message.to_string())
    }

    /// Answer only after `ms` milliseconds
    pub fn after(self, ms: u64) -> Self {
        match self {
            Reply::Body { status, body, .. } => Reply::Body {
                status,
                body,
                delay: Duration::from_millis(ms),
            },
            other => other,
        }
    }
}

type Script = Box<dyn Fn(&HttpRequest) -> Reply + Send + Sync>;

pub struct ScriptedTransport {
    script: Script,
    log: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: impl Fn(&HttpRequest) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            log: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    /// URLs with the base stripped, in send order
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url.trim_start_matches(BASE_URL).to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let reply = (self.script)(&request);
        self.log.lock().unwrap().push(request);
        match reply {
            Reply::Body {
                status,
                body,
                delay,
            } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(HttpResponse::new(status, body))
            }
            Reply::Fail(message) => Err(TransportError(message)),
        }
    }
}

pub const BASE_URL: &str = "http://tables.test/api/v1";

pub fn client(transport: Arc<ScriptedTransport>) -> Client {
    Client::with_transport(format!("{}/", BASE_URL), NoAuth, transport)
}

/// Value of `key` in the request's query string
pub fn query_param<'a>(request: &'a HttpRequest, key: &str) -> Option<&'a str> {
    request.query()?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then_some(v)
    })
}
