// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for contact submissions.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Counters exported on the metrics endpoint.
#[derive(Clone)]
pub struct ContactMetrics {
    registry: Registry,
    submissions: IntCounterVec,
    tracked_clients: IntGauge,
}

impl ContactMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new("contact_submissions_total", "Contact submissions by outcome"),
            &["outcome"],
        )?;
        let tracked_clients = IntGauge::new(
            "contact_rate_limit_clients",
            "Client addresses currently held by the submission limiter",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(tracked_clients.clone()))?;

        Ok(Self {
            registry,
            submissions,
            tracked_clients,
        })
    }

    /// Count one submission with the given outcome label.
    pub fn record(&self, outcome: &str) {
        self.submissions.with_label_values(&[outcome]).inc();
    }

    pub fn set_tracked_clients(&self, count: usize) {
        self.tracked_clients.set(count as i64);
    }

    pub fn count(&self, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[outcome]).get()
    }

    /// Render the registry in the text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
