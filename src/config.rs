// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the ingress guard service.
//!
//! Rate limit policies are compile-time constants selected per route by
//! name, or supplied inline. No file or environment variable governs the
//! policy table itself.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the ingress guard service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Guard configuration
    #[serde(default)]
    pub guard: GuardConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Guard behavior for the in-path endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Named policy applied by the direct-mode endpoint (default: standard)
    #[serde(default = "default_policy_name")]
    pub default_policy: String,

    /// Interval between store sweeps in seconds (default: 300)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// One rate limit bucket class: a fixed window and a request budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    /// Label used in the store key and in metrics.
    pub name: String,
    /// Window length in milliseconds.
    pub window_ms: i64,
    /// Requests allowed per window.
    pub max_requests: u32,
    /// Override for the rejection message shown to clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RateLimitPolicy {
    /// 10 requests per 15 minutes.
    pub fn strict() -> Self {
        Self::named("strict", 900_000, 10)
    }

    /// 100 requests per 15 minutes.
    pub fn standard() -> Self {
        Self::named("standard", 900_000, 100)
    }

    /// 1000 requests per hour.
    pub fn lenient() -> Self {
        Self::named("lenient", 3_600_000, 1000)
    }

    /// 50 requests per hour, for model-backed endpoints.
    pub fn ai() -> Self {
        Self::named("ai", 3_600_000, 50)
    }

    /// Ad hoc policy. Keyed in the store under the label `custom`.
    pub fn custom(window_ms: i64, max_requests: u32) -> Self {
        Self::named("custom", window_ms, max_requests)
    }

    /// Look up a predefined policy by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "strict" => Some(Self::strict()),
            "standard" => Some(Self::standard()),
            "lenient" => Some(Self::lenient()),
            "ai" => Some(Self::ai()),
            _ => None,
        }
    }

    fn named(name: &str, window_ms: i64, max_requests: u32) -> Self {
        Self { name: name.to_string(), window_ms, max_requests, message: None }
    }

    /// Attach a custom rejection message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms.max(0) as u64)
    }
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_policy_name() -> String {
    "standard".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            guard: GuardConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            default_policy: default_policy_name(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: default_true(), path: default_metrics_path() }
    }
}

impl GuardConfig {
    /// Resolve the configured default policy, falling back to `standard`
    /// when the name is unknown.
    pub fn policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::by_name(&self.default_policy).unwrap_or_else(RateLimitPolicy::standard)
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
