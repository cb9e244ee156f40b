//! Cross-origin response headers.
//!
//! One policy covers every response, errors and preflights included. With
//! an allow-list, a listed `Origin` is echoed back and anything else gets
//! the first listed origin. With no list, every origin is allowed (`*`).

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, ORIGIN, VARY,
        },
        HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";

/// Resolves the `Access-Control-Allow-Origin` value for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Every origin is allowed.
    Any,
    /// Allow-list; the first entry is the fallback.
    AllowList(Vec<String>),
}

impl CorsPolicy {
    pub fn from_origins(origins: &[String]) -> Self {
        if origins.is_empty() {
            CorsPolicy::Any
        } else {
            CorsPolicy::AllowList(origins.to_vec())
        }
    }

    pub fn allow_origin(&self, origin: Option<&str>) -> &str {
        match self {
            CorsPolicy::Any => "*",
            CorsPolicy::AllowList(list) => origin
                .and_then(|o| list.iter().find(|allowed| allowed.as_str() == o))
                .or_else(|| list.first())
                .map(String::as_str)
                .unwrap_or("*"),
        }
    }
}

/// Middleware that stamps the CORS and content-type headers onto every
/// response.
pub async fn apply_cors(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let mut response = next.run(request).await;

    let allow = policy.allow_origin(origin.as_deref());
    let headers = response.headers_mut();
    match HeaderValue::from_str(allow) {
        Ok(value) => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        Err(_) => tracing::warn!(origin = %allow, "configured origin is not a valid header value"),
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    if matches!(*policy, CorsPolicy::AllowList(_)) {
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }

    response
}
