// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for guard decisions.

use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};
use std::sync::LazyLock;

/// Requests allowed through the rate limiter, by policy.
pub static CHECKS_ALLOWED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "guard_checks_allowed_total",
        "Requests allowed by the rate limiter",
        &["policy"]
    )
    .expect("metric registration")
});

/// Requests rejected by the rate limiter, by policy.
pub static CHECKS_LIMITED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "guard_checks_limited_total",
        "Requests rejected by the rate limiter",
        &["policy"]
    )
    .expect("metric registration")
});

/// Request bodies the sanitizer had to rewrite.
pub static BODIES_REWRITTEN: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "guard_bodies_rewritten_total",
        "Request bodies changed by sanitization"
    )
    .expect("metric registration")
});

/// Render all registered metrics in the Prometheus text format.
pub fn render() -> Result<String, prometheus::Error> {
    use prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
