// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the ingress guard service.
//!
//! Two modes of operation, mirroring how the guard is deployed:
//!
//! 1. **External auth service**: a fronting proxy calls `/check` with the
//!    resolved identifier and receives the verdict in a 200 body.
//! 2. **Direct mode**: requests pass through `/submit`, which applies the
//!    guard in-path and returns 429 on rejection.

use crate::config::{Config, RateLimitPolicy};
use crate::guard::{
    client_identifier, error_response, sanitize_request_body, success_response, with_rate_limit,
};
use crate::limiter::RateLimiter;
use crate::metrics;
use crate::sanitizer::SanitizeOptions;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Guard check request (external auth mode).
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// Pre-resolved identifier; falls back to header resolution.
    #[serde(default)]
    pub identifier: Option<String>,
    /// Named policy; falls back to the configured default.
    #[serde(default)]
    pub policy: Option<String>,
    /// Body to sanitize when the request is allowed.
    #[serde(default)]
    pub body: Option<Value>,
    /// Sanitization toggles.
    #[serde(default)]
    pub sanitize: Option<SanitizeOptions>,
}

/// Guard check response.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized_body: Option<Value>,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "ingress-guard",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Evaluate the guard for a fronting proxy.
///
/// Always answers 200 so the proxy can read the verdict body; the only
/// error status is 400 for an unknown policy name.
pub async fn check(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CheckRequest>,
) -> Response {
    let identifier = req.identifier.unwrap_or_else(|| client_identifier(&headers));

    let policy = match req.policy.as_deref() {
        Some(name) => match RateLimitPolicy::by_name(name) {
            Some(policy) => policy,
            None => {
                warn!(policy = %name, "unknown policy name in check request");
                return error_response(StatusCode::BAD_REQUEST, "Unknown policy", None);
            }
        },
        None => state.config.guard.policy(),
    };

    debug!(identifier = %identifier, policy = %policy.name, "processing guard check");

    let decision = state.limiter.check(&identifier, &policy).await;
    if decision.allowed {
        metrics::CHECKS_ALLOWED.with_label_values(&[&policy.name]).inc();
    } else {
        metrics::CHECKS_LIMITED.with_label_values(&[&policy.name]).inc();
    }

    let sanitized_body = if decision.allowed {
        let options = req.sanitize.unwrap_or_default();
        req.body.as_ref().map(|body| sanitize_request_body(body, &options))
    } else {
        None
    };

    (
        StatusCode::OK,
        Json(CheckResponse {
            allowed: decision.allowed,
            remaining: decision.allowed.then_some(decision.remaining),
            retry_after_secs: decision.retry_after_secs,
            sanitized_body,
        }),
    )
        .into_response()
}

/// Direct-mode guarded endpoint: rate limit, sanitize, echo the cleaned
/// payload in the success envelope.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let policy = state.config.guard.policy();

    if let Some(rejection) = with_rate_limit(&state.limiter, &headers, &policy).await {
        return rejection;
    }

    let cleaned = sanitize_request_body(&body, &SanitizeOptions::default());
    success_response(StatusCode::OK, cleaned)
}

/// Prometheus metrics endpoint.
pub async fn metrics_endpoint() -> Response {
    match metrics::render() {
        Ok(text) => ([("content-type", "text/plain; version=0.0.4")], text).into_response(),
        Err(err) => {
            warn!(error = %err, "failed to encode metrics");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Metrics unavailable", None)
        }
    }
}
