// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact service.
//!
//! Every field has a default so a partially specified config (or none at
//! all) still produces a usable service. Credentials are the exception:
//! they default to empty and the relay reports a configuration error until
//! they are supplied.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the contact service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:5000)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Deployment environment; diagnostics are only exposed in `development`
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Use the first `X-Forwarded-For` entry as the client identifier
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Mail transport configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Sliding window limits applied per client address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Admitted submissions per client within one window (default: 5)
    #[serde(default = "default_max_submissions")]
    pub max_submissions: u32,

    /// Window length in seconds (default: 900)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Interval between sweeps of idle clients in seconds (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// SMTP account and message settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Authenticated account, also used as the From address
    #[serde(default)]
    pub account: String,

    /// Account secret (app password)
    #[serde(default)]
    pub secret: String,

    /// SMTP relay host (default: smtp.gmail.com)
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP submission port (default: 465)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Where notifications go; falls back to `account`
    #[serde(default)]
    pub owner_address: Option<String>,

    /// Name used to sign the auto-reply
    #[serde(default)]
    pub signature: Option<String>,

    /// Send the acknowledgment message to the submitter (default: true)
    #[serde(default = "default_true")]
    pub auto_reply: bool,

    /// Check the transport before each relay (default: true)
    #[serde(default = "default_true")]
    pub verify_before_send: bool,

    /// Record messages in memory instead of sending them (default: false)
    #[serde(default)]
    pub dry_run: bool,
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

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_max_submissions() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
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
            environment: default_environment(),
            trust_forwarded_for: false,
            rate_limit: RateLimitConfig::default(),
            mail: MailConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: default_max_submissions(),
            window_secs: default_window_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            secret: String::new(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            owner_address: None,
            signature: None,
            auto_reply: default_true(),
            verify_before_send: default_true(),
            dry_run: false,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Config {
    /// Whether error diagnostics may be returned to clients.
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the idle sweep interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl MailConfig {
    /// Both halves of the credential pair are present.
    pub fn has_credentials(&self) -> bool {
        !self.account.trim().is_empty() && !self.secret.is_empty()
    }

    /// Recipient of owner notifications.
    pub fn owner(&self) -> &str {
        self.owner_address.as_deref().unwrap_or(&self.account)
    }
}
