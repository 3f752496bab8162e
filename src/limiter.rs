// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter.
//!
//! Counts requests per composite key (`identifier:policy`) within a fixed
//! window. The request that brings the count exactly to the policy maximum
//! is the last one allowed; the next is the first rejected.
//!
//! The counter store is process-local. In a horizontally scaled deployment
//! each instance counts independently, so the effective limit is
//! `max_requests x instance_count`. [`RateLimitStore`] is the seam for
//! substituting a shared backend without touching call sites.

use crate::config::RateLimitPolicy;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// One live counter. Expired the instant `now > reset_at_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests counted in the current window, including the one being checked.
    pub count: u32,
    /// Window end, epoch milliseconds.
    pub reset_at_ms: i64,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the window after this one.
    pub remaining: u32,
    /// Window end, epoch milliseconds.
    pub reset_at_ms: i64,
    /// Seconds until the window resets. Populated only on rejection.
    pub retry_after_secs: Option<u64>,
}

/// Counter storage backend.
///
/// The single operation is transactional: a separate get-then-set pair
/// would race between concurrently polled requests on a multi-threaded
/// runtime. A shared backend maps this to its own atomic primitive
/// (e.g. INCR + EXPIRE).
#[allow(async_fn_in_trait)]
pub trait RateLimitStore: Send + Sync {
    /// Increment the counter for `key`, creating or replacing the entry
    /// when absent or expired. Returns the entry after the increment.
    async fn check_and_increment(&self, key: &str, window_ms: i64, now_ms: i64) -> RateLimitEntry;

    /// Drop entries whose window has passed. Returns how many were removed.
    async fn purge_expired(&self, now_ms: i64) -> usize;
}

/// In-memory store: a process-wide map behind a write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, RateLimitEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (not yet swept) entries. Test and metrics aid.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl RateLimitStore for MemoryStore {
    async fn check_and_increment(&self, key: &str, window_ms: i64, now_ms: i64) -> RateLimitEntry {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if now_ms <= entry.reset_at_ms => {
                entry.count += 1;
                *entry
            }
            _ => {
                // Absent or expired: a fresh entry replaces it.
                let fresh = RateLimitEntry { count: 1, reset_at_ms: now_ms + window_ms };
                entries.insert(key.to_string(), fresh);
                fresh
            }
        }
    }

    async fn purge_expired(&self, now_ms: i64) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now_ms <= entry.reset_at_ms);
        before - entries.len()
    }
}

/// Rate limiter over a counter store.
#[derive(Debug, Default)]
pub struct RateLimiter<S = MemoryStore> {
    store: S,
}

impl RateLimiter<MemoryStore> {
    /// Limiter backed by the in-memory store.
    pub fn new() -> Self {
        Self { store: MemoryStore::new() }
    }
}

impl<S: RateLimitStore> RateLimiter<S> {
    /// Limiter over a caller-supplied backend.
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Count this request against `identifier` under `policy`.
    pub async fn check(&self, identifier: &str, policy: &RateLimitPolicy) -> RateLimitDecision {
        self.check_at(identifier, policy, Utc::now().timestamp_millis()).await
    }

    async fn check_at(
        &self,
        identifier: &str,
        policy: &RateLimitPolicy,
        now_ms: i64,
    ) -> RateLimitDecision {
        let key = format!("{identifier}:{}", policy.name);
        let entry = self.store.check_and_increment(&key, policy.window_ms, now_ms).await;

        let allowed = entry.count <= policy.max_requests;
        let remaining = policy.max_requests.saturating_sub(entry.count);
        let retry_after_secs = if allowed {
            None
        } else {
            let wait_ms = (entry.reset_at_ms - now_ms).max(0) as u64;
            Some(wait_ms.div_ceil(1000))
        };

        if allowed {
            trace!(key = %key, count = entry.count, remaining, "rate limit check passed");
        } else {
            debug!(
                key = %key,
                count = entry.count,
                limit = policy.max_requests,
                retry_after_secs = retry_after_secs.unwrap_or(0),
                "rate limit exceeded"
            );
        }

        RateLimitDecision { allowed, remaining, reset_at_ms: entry.reset_at_ms, retry_after_secs }
    }

    /// Drop expired entries. Housekeeping only: expired entries are already
    /// ignored by [`check`](Self::check), so correctness never depends on
    /// this running.
    pub async fn sweep(&self) -> usize {
        self.store.purge_expired(Utc::now().timestamp_millis()).await
    }
}

/// Spawn the periodic sweep as a task owned by the caller.
///
/// The first tick fires after one full `interval`. The returned handle is
/// the lifecycle contract: hold it for the life of the process and abort
/// it on shutdown.
pub fn spawn_sweeper(
    limiter: Arc<RateLimiter<MemoryStore>>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // immediate first tick
        loop {
            ticker.tick().await;
            let removed = limiter.sweep().await;
            if removed > 0 {
                debug!(removed, "swept expired rate limit entries");
            }
        }
    })
}
