// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding window submission limiter.
//!
//! Each client identifier owns a list of the instants at which it was
//! admitted. A check prunes instants older than the window, rejects when
//! the quota is already used, and otherwise records the new instant. The
//! prune/count/record sequence happens under one lock so concurrent
//! requests from the same client cannot overrun the quota.
//!
//! State is process-local. Several instances behind a load balancer each
//! keep their own counts.

use crate::clock::{Clock, SystemClock};
use crate::config::RateLimitConfig;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Submission is admitted
    Allowed {
        /// Admissions left in the current window
        remaining: u32,
        /// Time until the oldest admission leaves the window
        reset_in: Duration,
    },
    /// Submission is rejected
    Limited {
        /// Time until another admission becomes possible
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Outcome of one atomic window update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDecision {
    /// `now` was recorded; `count` includes it
    Recorded { count: u32, oldest: Instant },
    /// Quota already used; nothing recorded
    Full { oldest: Instant },
}

/// Storage for per-client admission instants.
///
/// Implementations must perform `hit` as a single atomic step with
/// respect to other calls for the same key.
pub trait RateStore: Send + Sync {
    /// Drop instants at or before `now - window`, then record `now` if
    /// fewer than `quota` remain.
    fn hit(&self, key: &str, now: Instant, window: Duration, quota: u32) -> WindowDecision;

    /// Remove keys with no instant inside the window. Returns how many
    /// keys were dropped.
    fn sweep(&self, now: Instant, window: Duration) -> usize;

    /// Number of tracked keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store keyed by client identifier.
#[derive(Debug, Default)]
pub struct MemoryRateStore {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn prune(entries: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = entries.front() {
        if now.saturating_duration_since(front) >= window {
            entries.pop_front();
        } else {
            break;
        }
    }
}

impl RateStore for MemoryRateStore {
    fn hit(&self, key: &str, now: Instant, window: Duration, quota: u32) -> WindowDecision {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let entries = windows.entry(key.to_string()).or_default();

        prune(entries, now, window);

        if entries.len() >= quota as usize {
            // quota of zero leaves the list empty; treat now as the oldest
            let oldest = entries.front().copied().unwrap_or(now);
            return WindowDecision::Full { oldest };
        }

        entries.push_back(now);
        WindowDecision::Recorded {
            count: entries.len() as u32,
            oldest: entries.front().copied().unwrap_or(now),
        }
    }

    fn sweep(&self, now: Instant, window: Duration) -> usize {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let before = windows.len();
        windows.retain(|_, entries| {
            prune(entries, now, window);
            !entries.is_empty()
        });
        before - windows.len()
    }

    fn len(&self) -> usize {
        self.windows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Per-client submission limiter.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a limiter with an in-memory store and the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_parts(config, Arc::new(MemoryRateStore::new()), Arc::new(SystemClock))
    }

    /// Create a limiter over an explicit store and clock.
    pub fn with_parts(config: RateLimitConfig, store: Arc<dyn RateStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check a client against its window at the current time.
    pub fn check(&self, client: &str) -> RateLimitResult {
        self.check_at(client, self.clock.now())
    }

    /// Check a client against its window at `now`.
    pub fn check_at(&self, client: &str, now: Instant) -> RateLimitResult {
        let window = self.config.window_duration();
        let quota = self.config.max_submissions;

        match self.store.hit(client, now, window, quota) {
            WindowDecision::Recorded { count, oldest } => RateLimitResult::Allowed {
                remaining: quota.saturating_sub(count),
                reset_in: window.saturating_sub(now.saturating_duration_since(oldest)),
            },
            WindowDecision::Full { oldest } => {
                let retry_after = window.saturating_sub(now.saturating_duration_since(oldest));
                debug!(client = %client, ?retry_after, "Submission quota exhausted");
                RateLimitResult::Limited { retry_after }
            }
        }
    }

    /// Drop clients whose window has fully expired.
    pub fn cleanup(&self) -> usize {
        let removed = self.store.sweep(self.clock.now(), self.config.window_duration());
        if removed > 0 {
            debug!(removed, remaining = self.store.len(), "Swept idle clients");
        }
        removed
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }
}
