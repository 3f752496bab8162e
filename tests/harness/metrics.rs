// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for attack simulation results.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Collects metrics during attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Start time of the attack
    start_time: Option<Instant>,
    /// End time of the attack
    end_time: Option<Instant>,
    /// Count of requests by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Count of requests by identifier
    requests_per_identifier: HashMap<String, usize>,
    /// Bodies the sanitizer had to rewrite
    bodies_rewritten: usize,
    /// Latency samples (microseconds)
    latencies: Vec<u64>,
}

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    RateLimited,
}

impl AttackMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of an attack.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Mark the end of an attack.
    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Record a request outcome.
    pub fn record(&mut self, outcome: Outcome, identifier: &str, rewritten: bool, latency: Duration) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_identifier.entry(identifier.to_string()).or_insert(0) += 1;
        if rewritten {
            self.bodies_rewritten += 1;
        }
        self.latencies.push(latency.as_micros() as u64);
    }

    /// Get total request count.
    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Get duration of the attack.
    pub fn duration(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Get block rate (ratio of blocked to total).
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        let allowed = self.count(Outcome::Allowed);
        (total - allowed) as f64 / total as f64
    }

    /// Get median latency in microseconds.
    pub fn median_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }

    /// Get p99 latency in microseconds.
    pub fn p99_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        let idx = (sorted.len() as f64 * 0.99) as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    /// Get number of unique identifiers that made requests.
    pub fn unique_identifiers(&self) -> usize {
        self.requests_per_identifier.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            allowed: self.count(Outcome::Allowed),
            rate_limited: self.count(Outcome::RateLimited),
            bodies_rewritten: self.bodies_rewritten,
            duration_ms: self.duration().as_millis() as u64,
            block_rate: self.block_rate(),
            median_latency_us: self.median_latency_us(),
            p99_latency_us: self.p99_latency_us(),
            unique_identifiers: self.unique_identifiers(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub allowed: usize,
    pub rate_limited: usize,
    pub bodies_rewritten: usize,
    pub duration_ms: u64,
    pub block_rate: f64,
    pub median_latency_us: u64,
    pub p99_latency_us: u64,
    pub unique_identifiers: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Duration:          {} ms", self.duration_ms)?;
        writeln!(f, "Total Requests:    {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(
            f,
            "Allowed:           {} ({:.1}%)",
            self.allowed,
            self.allowed as f64 / self.total_requests.max(1) as f64 * 100.0
        )?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "Bodies Rewritten:  {}", self.bodies_rewritten)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f)?;
        writeln!(f, "--- Latency ---")?;
        writeln!(f, "Median:            {} us", self.median_latency_us)?;
        writeln!(f, "P99:               {} us", self.p99_latency_us)?;
        writeln!(f)?;
        writeln!(f, "--- Distribution ---")?;
        writeln!(f, "Unique Clients:    {}", self.unique_identifiers)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = AttackMetrics::new();
        metrics.start();

        metrics.record(Outcome::Allowed, "10.0.0.1", false, Duration::from_micros(100));
        metrics.record(Outcome::Allowed, "10.0.0.2", true, Duration::from_micros(150));
        metrics.record(Outcome::RateLimited, "10.0.0.1", false, Duration::from_micros(50));

        metrics.finish();

        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(metrics.count(Outcome::Allowed), 2);
        assert_eq!(metrics.count(Outcome::RateLimited), 1);
        assert_eq!(metrics.unique_identifiers(), 2);
        assert_eq!(metrics.report().bodies_rewritten, 1);
    }

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Allowed, "10.0.0.1", false, Duration::ZERO);
        }
        for _ in 0..7 {
            metrics.record(Outcome::RateLimited, "10.0.0.1", false, Duration::ZERO);
        }

        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }
}
