// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome collection for abuse simulation results.

use std::collections::HashMap;
use std::time::Duration;

/// Collects outcomes during an attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Count of submissions by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Count of submissions by client
    requests_per_client: HashMap<String, usize>,
    /// Pipeline latency samples (microseconds)
    latencies: Vec<u64>,
}

/// Terminal state of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Sent,
    RateLimited,
    MissingFields,
    InvalidEmail,
    Failed,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission outcome.
    pub fn record(&mut self, outcome: Outcome, client: &str, latency: Duration) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_client.entry(client.to_string()).or_insert(0) += 1;
        self.latencies.push(latency.as_micros() as u64);
    }

    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Ratio of submissions that were not relayed.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(Outcome::Sent)) as f64 / total as f64
    }

    pub fn median_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }

    pub fn unique_clients(&self) -> usize {
        self.requests_per_client.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            sent: self.count(Outcome::Sent),
            rate_limited: self.count(Outcome::RateLimited),
            validation_failed: self.count(Outcome::MissingFields) + self.count(Outcome::InvalidEmail),
            failed: self.count(Outcome::Failed),
            block_rate: self.block_rate(),
            median_latency_us: self.median_latency_us(),
            unique_clients: self.unique_clients(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub sent: usize,
    pub rate_limited: usize,
    pub validation_failed: usize,
    pub failed: usize,
    pub block_rate: f64,
    pub median_latency_us: u64,
    pub unique_clients: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Abuse Simulation Report ===")?;
        writeln!(f, "Total Submissions: {}", self.total_requests)?;
        writeln!(f, "Sent:              {}", self.sent)?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "Validation Failed: {}", self.validation_failed)?;
        writeln!(f, "Relay Failed:      {}", self.failed)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f, "Median Latency:    {} us", self.median_latency_us)?;
        writeln!(f, "Unique Clients:    {}", self.unique_clients)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Sent, "10.0.0.1", Duration::ZERO);
        }
        for _ in 0..7 {
            metrics.record(Outcome::RateLimited, "10.0.0.1", Duration::ZERO);
        }

        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
        assert_eq!(metrics.unique_clients(), 1);
    }
}
