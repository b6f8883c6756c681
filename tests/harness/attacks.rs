// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse patterns for security testing.

use super::generators::PayloadKind;
use std::time::Duration;

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions to send
    pub total_requests: usize,
    /// Simulated time between consecutive submissions
    pub interval: Duration,
    /// Number of distinct client addresses, used round-robin
    pub unique_clients: usize,
    /// Shape of every payload
    pub payload: PayloadKind,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            interval: Duration::from_secs(1),
            unique_clients: 1,
            payload: PayloadKind::Valid,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single client flood - one address hammering the form.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            interval: Duration::from_millis(100),
            ..Default::default()
        }
    }

    /// Distributed spam - many addresses, a few submissions each.
    pub fn distributed_spam() -> Self {
        Self {
            total_requests: 200,
            unique_clients: 50,
            ..Default::default()
        }
    }

    /// Slow drip - one address staying under the window quota.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 20,
            interval: Duration::from_secs(4 * 60),
            ..Default::default()
        }
    }

    /// Junk flood - incomplete payloads from one address.
    pub fn missing_fields_flood() -> Self {
        Self {
            total_requests: 50,
            payload: PayloadKind::MissingFields,
            ..Default::default()
        }
    }

    /// Address probing - malformed emails from a handful of addresses.
    pub fn bad_email_probe() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 10,
            payload: PayloadKind::BadEmail,
            ..Default::default()
        }
    }

    /// Simulated span of the attack.
    pub fn expected_duration(&self) -> Duration {
        self.interval * self.total_requests as u32
    }
}

/// Expected outcomes for an attack against a given quota and window.
#[derive(Debug, Clone, Copy)]
pub struct AttackExpectations {
    /// Upper bound on relayed submissions
    pub max_sent: usize,
    /// Lower bound on rate limited submissions
    pub min_rate_limited: usize,
}

impl AttackConfig {
    /// Get expected outcomes for this attack pattern.
    pub fn expectations(&self, quota: usize, window: Duration) -> AttackExpectations {
        let per_client = self.total_requests.div_ceil(self.unique_clients);
        // Windows touched by one client's traffic, each granting a full quota
        let client_span = self.interval * (per_client.saturating_sub(1) * self.unique_clients) as u32;
        let windows = (client_span.as_secs() / window.as_secs().max(1)) as usize + 1;
        let admitted_per_client = per_client.min(quota * windows);

        let max_admitted = admitted_per_client * self.unique_clients;
        let max_sent = match self.payload {
            PayloadKind::Valid => max_admitted,
            PayloadKind::MissingFields | PayloadKind::BadEmail => 0,
        };

        let min_rate_limited = if windows == 1 {
            self.total_requests.saturating_sub(quota * self.unique_clients)
        } else {
            0
        };

        AttackExpectations {
            max_sent,
            min_rate_limited,
        }
    }
}
