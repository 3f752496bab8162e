// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Ingress Request Guard
//!
//! This crate provides a composable guard layer applied to inbound HTTP
//! requests before business logic runs:
//!
//! - Per-client rate limiting with named policies (fixed windows)
//! - Input sanitization for text, HTML fragments, emails, URLs, and
//!   nested JSON bodies
//! - Route-facing composition: identifier resolution, 429 construction
//!   with retry metadata, response envelopes
//!
//! ## Deployment note
//!
//! The counter store is in-memory and process-local. Horizontally scaled
//! deployments multiply the effective limit by the instance count; swap
//! in a shared [`limiter::RateLimitStore`] backend to get a global limit.

pub mod config;
pub mod guard;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod sanitizer;

pub use config::{Config, RateLimitPolicy};
pub use guard::{client_identifier, validate_email, validate_url, with_rate_limit, ValidationError};
pub use limiter::{spawn_sweeper, MemoryStore, RateLimitDecision, RateLimiter};
pub use sanitizer::{
    sanitize_email, sanitize_html, sanitize_text, sanitize_url, sanitize_value, SanitizeOptions,
};
