// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request guard composition.
//!
//! The route-facing layer: resolves a client identifier, applies a rate
//! limit policy, and sanitizes request bodies before business logic runs.
//! A guarded handler does:
//!
//! ```ignore
//! if let Some(rejection) = with_rate_limit(&limiter, &headers, &policy).await {
//!     return rejection;
//! }
//! let body = sanitize_request_body(&body, &SanitizeOptions::default());
//! ```

use crate::config::RateLimitPolicy;
use crate::limiter::{RateLimitDecision, RateLimitStore, RateLimiter};
use crate::metrics;
use crate::sanitizer::{self, SanitizeOptions};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;
use url::Url;

const DEFAULT_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

/// Proxy headers consulted after `x-forwarded-for`, in order.
const FALLBACK_IP_HEADERS: [&str; 2] = ["x-real-ip", "cf-connecting-ip"];

/// Validation error for the explicit email/URL wrappers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid email address format")]
    InvalidEmail,

    #[error("URL must be absolute http(s), root-relative, or a fragment")]
    InvalidUrl,
}

/// Rejection body sent with 429 responses.
#[derive(Debug, Serialize)]
struct RateLimitedBody {
    error: &'static str,
    message: String,
    #[serde(rename = "retryAfter")]
    retry_after: u64,
}

/// Resolve the rate limit bucket key for a request.
///
/// Inspects `x-forwarded-for` (first entry), then `x-real-ip`, then
/// `cf-connecting-ip`, falling back to the literal `"unknown"`. Trusts
/// upstream proxy headers, so it is spoofable: good enough for abuse
/// mitigation, not for identity.
pub fn client_identifier(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    for name in FALLBACK_IP_HEADERS {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    "unknown".to_string()
}

/// Apply `policy` to the request. `None` means proceed; `Some` is a
/// finished 429 response to return as-is.
pub async fn with_rate_limit<S: RateLimitStore>(
    limiter: &RateLimiter<S>,
    headers: &HeaderMap,
    policy: &RateLimitPolicy,
) -> Option<Response> {
    let identifier = client_identifier(headers);
    let decision = limiter.check(&identifier, policy).await;

    if decision.allowed {
        metrics::CHECKS_ALLOWED.with_label_values(&[&policy.name]).inc();
        return None;
    }

    metrics::CHECKS_LIMITED.with_label_values(&[&policy.name]).inc();
    info!(
        identifier = %identifier,
        policy = %policy.name,
        retry_after_secs = decision.retry_after_secs.unwrap_or(0),
        "request rate limited"
    );
    Some(rate_limited_response(policy, &decision))
}

/// Build the 429 response for a rejected check.
pub fn rate_limited_response(policy: &RateLimitPolicy, decision: &RateLimitDecision) -> Response {
    let retry_after = decision.retry_after_secs.unwrap_or_default();
    let reset_at = DateTime::<Utc>::from_timestamp_millis(decision.reset_at_ms)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();

    let body = RateLimitedBody {
        error: "Too many requests",
        message: policy.message.clone().unwrap_or_else(|| DEFAULT_LIMIT_MESSAGE.to_string()),
        retry_after,
    };

    (
        StatusCode::TOO_MANY_REQUESTS,
        [
            ("X-RateLimit-Limit", policy.max_requests.to_string()),
            ("X-RateLimit-Remaining", "0".to_string()),
            ("X-RateLimit-Reset", reset_at),
            ("Retry-After", retry_after.to_string()),
        ],
        Json(body),
    )
        .into_response()
}

/// Sanitize a request body ahead of the route handler.
pub fn sanitize_request_body(body: &Value, options: &SanitizeOptions) -> Value {
    let cleaned = sanitizer::sanitize_value(body, options);
    if cleaned != *body {
        metrics::BODIES_REWRITTEN.inc();
    }
    cleaned
}

/// Validate and normalize an email address.
///
/// Unlike [`sanitizer::sanitize_email`], absent-vs-invalid is observable:
/// a malformed address is an explicit error, not a silent empty string.
pub fn validate_email(input: &str) -> Result<String, ValidationError> {
    let sanitized = sanitizer::sanitize_email(input);
    if sanitized.is_empty() {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(sanitized)
}

/// Validate a URL, additionally requiring absolute forms to parse with a
/// host.
pub fn validate_url(input: &str) -> Result<String, ValidationError> {
    let sanitized = sanitizer::sanitize_url(input);
    if sanitized.is_empty() {
        return Err(ValidationError::InvalidUrl);
    }
    if !sanitized.starts_with('/') && !sanitized.starts_with('#') {
        let parsed = Url::parse(&sanitized).map_err(|_| ValidationError::InvalidUrl)?;
        if parsed.host_str().is_none() {
            return Err(ValidationError::InvalidUrl);
        }
    }
    Ok(sanitized)
}

/// Standard success envelope: `{"success": true, "data": ...}`.
pub fn success_response(status: StatusCode, data: Value) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

/// Standard error envelope: `{"error": message, ...details}`.
pub fn error_response(status: StatusCode, message: &str, details: Option<Value>) -> Response {
    let mut body = serde_json::Map::new();
    body.insert("error".to_string(), Value::String(message.to_string()));
    if let Some(Value::Object(extra)) = details {
        body.extend(extra);
    }
    (status, Json(Value::Object(body))).into_response()
}
