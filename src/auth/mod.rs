//! Request-header providers for the two authentication schemes
//!
//! - `ApiKeyAuth`: external SDK consumers, `X-API-Key: <key>`
//! - `CsrfCookieAuth`: same-origin dashboard sessions, `X-CSRFToken` read from
//!   the `csrftoken` cookie at request time
//!
//! Providers are consulted on every request, so a cookie that rotates during
//! a session is picked up without rebuilding the client.

use std::fmt;
use std::sync::Arc;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_COOKIE: &str = "csrftoken";

/// Supplies authentication headers for outgoing requests
pub trait HeaderProvider: Send + Sync {
    fn headers(&self) -> Vec<(String, String)>;
}

/// No authentication headers
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl HeaderProvider for NoAuth {
    fn headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// API key authentication
#[derive(Clone)]
pub struct ApiKeyAuth {
    key: String,
}

impl ApiKeyAuth {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

// Keep the key out of debug output.
impl fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.key.chars().take(3).collect();
        f.debug_struct("ApiKeyAuth")
            .field("key", &format!("{}...", prefix))
            .finish()
    }
}

impl HeaderProvider for ApiKeyAuth {
    fn headers(&self) -> Vec<(String, String)> {
        vec![(API_KEY_HEADER.to_string(), self.key.clone())]
    }
}

type CookieSource = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Session authentication via the CSRF cookie
#[derive(Clone)]
pub struct CsrfCookieAuth {
    cookies: CookieSource,
}

impl CsrfCookieAuth {
    /// Read cookies from a callback returning the raw `Cookie` header value
    pub fn new(cookies: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            cookies: Arc::new(cookies),
        }
    }

    /// Fixed cookie string
    pub fn from_cookie_header(cookies: impl Into<String>) -> Self {
        let cookies = cookies.into();
        Self::new(move || Some(cookies.clone()))
    }

    pub fn token(&self) -> Option<String> {
        (self.cookies)().and_then(|raw| cookie_value(&raw, CSRF_COOKIE))
    }
}

impl fmt::Debug for CsrfCookieAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfCookieAuth").finish_non_exhaustive()
    }
}

impl HeaderProvider for CsrfCookieAuth {
    fn headers(&self) -> Vec<(String, String)> {
        match self.token() {
            Some(token) => vec![(CSRF_HEADER.to_string(), token)],
            None => Vec::new(),
        }
    }
}

/// Extract and percent-decode one cookie from a `Cookie` header value
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| {
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_header() {
        let auth = ApiKeyAuth::new("sk_secret");
        assert_eq!(
            auth.headers(),
            vec![("X-API-Key".to_string(), "sk_secret".to_string())]
        );
        assert!(!format!("{:?}", auth).contains("secret"));
    }

    #[test]
    fn test_cookie_value() {
        let raw = "sessionid=abc; csrftoken=tok%2B1; theme=dark";
        assert_eq!(cookie_value(raw, "csrftoken").as_deref(), Some("tok+1"));
        assert_eq!(cookie_value(raw, "theme").as_deref(), Some("dark"));
        assert_eq!(cookie_value(raw, "missing"), None);
        assert_eq!(cookie_value("", "csrftoken"), None);
    }

    #[test]
    fn test_csrf_headers() {
        let auth = CsrfCookieAuth::from_cookie_header("csrftoken=xyz");
        assert_eq!(
            auth.headers(),
            vec![("X-CSRFToken".to_string(), "xyz".to_string())]
        );

        let auth = CsrfCookieAuth::new(|| None);
        assert!(auth.headers().is_empty());
    }
}
