//! Request gatekeeping
//!
//! Two collaborators every `/api` handler consults before touching the
//! store: a rate limiter keyed by client, and an admin credential check for
//! writes. Both are traits so deployments can swap in their own.

use axum::http::HeaderMap;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const ADMIN_COOKIE: &str = "admin_auth";
pub const ADMIN_HEADER: &str = "x-admin-token";

/// Decides whether an opaque credential grants admin access
pub trait AdminAuth: Send + Sync {
    fn verify(&self, credential: &str) -> bool;
}

/// Compares the credential against a configured token.
///
/// With no token configured every credential is refused.
#[derive(Debug, Clone, Default)]
pub struct TokenAuth {
    token: Option<String>,
}

impl TokenAuth {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

impl AdminAuth for TokenAuth {
    fn verify(&self, credential: &str) -> bool {
        match &self.token {
            Some(token) => constant_time_eq(token.as_bytes(), credential.as_bytes()),
            None => false,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Allow/deny per client identifier
pub trait RateLimiter: Send + Sync {
    fn check(&self, client: &str) -> bool;
}

/// Never denies
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn check(&self, _client: &str) -> bool {
        true
    }
}

/// At most `limit` requests per client per window
#[derive(Debug)]
pub struct FixedWindowLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Drop expired windows so the map does not grow without bound
        if windows.len() > 10_000 {
            windows.retain(|_, (start, _)| now.duration_since(*start) < self.window);
        }

        let entry = windows.entry(client.to_string()).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }
        if entry.1 >= self.limit {
            return false;
        }
        entry.1 += 1;
        true
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }
}

/// Client identifier for rate limiting (first forwarded address)
pub fn client_id(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        })
        .unwrap_or("unknown")
        .to_string()
}

/// Admin credential from the `admin_auth` cookie or the `x-admin-token` header
pub fn admin_credential(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ADMIN_COOKIE)
        .map(|(_, value)| value.to_string());

    from_cookie.or_else(|| {
        headers
            .get(ADMIN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_auth() {
        let auth = TokenAuth::new(Some("secret".to_string()));
        assert!(auth.verify("secret"));
        assert!(!auth.verify("secret2"));
        assert!(!auth.verify(""));

        let closed = TokenAuth::new(None);
        assert!(!closed.verify(""));
        assert!(!TokenAuth::new(Some(String::new())).verify(""));
    }

    #[test]
    fn test_fixed_window() {
        let limiter = FixedWindowLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.check_at("a", start));
        assert!(limiter.check_at("a", start));
        assert!(!limiter.check_at("a", start + Duration::from_secs(1)));
        assert!(limiter.check_at("b", start));

        assert!(limiter.check_at("a", start + Duration::from_secs(61)));
    }

    #[test]
    fn test_client_id_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_id(&headers), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_id(&headers), "10.0.0.2");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_id(&headers), "203.0.113.7");
    }

    #[test]
    fn test_admin_credential_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(admin_credential(&headers), None);

        headers.insert(ADMIN_HEADER, HeaderValue::from_static("from-header"));
        assert_eq!(admin_credential(&headers).as_deref(), Some("from-header"));

        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("theme=dark; admin_auth=from-cookie"),
        );
        assert_eq!(admin_credential(&headers).as_deref(), Some("from-cookie"));
    }
}
