// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Portfolio Contact Service
//!
//! Receives contact form submissions on `POST /api/contact`, limits each
//! client to a few submissions per window, and relays accepted messages to
//! the site owner with an auto-reply to the sender.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! read first when present):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:5000)
//! - `EMAIL_USER` / `EMAIL_PASS`: SMTP account and app password
//! - `SMTP_HOST` / `SMTP_PORT`: SMTP relay (default: smtp.gmail.com:465)
//! - `OWNER_ADDRESS`: Notification recipient (default: `EMAIL_USER`)
//! - `SIGNATURE`: Name signed under the auto-reply
//! - `AUTO_REPLY`: Send the auto-reply (default: true)
//! - `RATE_LIMIT_MAX`: Submissions per window per client (default: 5)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length (default: 900)
//! - `APP_ENV` / `NODE_ENV`: `development` exposes error detail
//! - `TRUST_FORWARDED_FOR`: Key clients by `X-Forwarded-For`
//! - `MAIL_DRY_RUN`: Log messages instead of sending them
//! - `METRICS_ENABLED`: Serve `/metrics` (default: true)

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use portfolio_contact::{
    config::{Config, MailConfig, RateLimitConfig},
    handlers::{router, AppState},
    limiter::RateLimiter,
    mailer::{LogMailer, MailSender, SmtpMailer},
    metrics::ContactMetrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    dotenvy::dotenv().ok();

    let config = load_config();
    info!(
        bind_addr = %config.bind_addr,
        environment = %config.environment,
        max_submissions = config.rate_limit.max_submissions,
        window_secs = config.rate_limit.window_secs,
        smtp_host = %config.mail.smtp_host,
        account = if config.mail.account.is_empty() { "NOT SET" } else { config.mail.account.as_str() },
        "Starting portfolio contact service"
    );

    let sender: Arc<dyn MailSender> = if config.mail.dry_run {
        warn!("MAIL_DRY_RUN is set, messages will be logged but not sent");
        Arc::new(LogMailer::new())
    } else {
        Arc::new(SmtpMailer::new(&config.mail)?)
    };

    // Report transport readiness without refusing to start
    match sender.verify().await {
        Ok(()) => info!("Mail transport is ready"),
        Err(e) => warn!(error = %e, "Mail transport check failed"),
    }

    let limiter = RateLimiter::new(config.rate_limit.clone());
    let metrics = ContactMetrics::new()?;
    let state = Arc::new(AppState::new(config.clone(), limiter, sender, metrics));

    // Spawn cleanup task
    let cleanup_state = state.clone();
    let cleanup_every = config.rate_limit.cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup();
            cleanup_state
                .metrics
                .set_tracked_clients(cleanup_state.limiter.tracked_clients());
        }
    });

    let app = router(state);

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    let defaults = Config::default();
    let mail_defaults = MailConfig::default();
    let rate_defaults = RateLimitConfig::default();

    Config {
        bind_addr: env_or("BIND_ADDR", defaults.bind_addr),
        environment: env_opt("APP_ENV")
            .or_else(|| env_opt("NODE_ENV"))
            .unwrap_or(defaults.environment),
        trust_forwarded_for: env_or("TRUST_FORWARDED_FOR", false),
        rate_limit: RateLimitConfig {
            max_submissions: env_or("RATE_LIMIT_MAX", rate_defaults.max_submissions),
            window_secs: env_or("RATE_LIMIT_WINDOW_SECS", rate_defaults.window_secs),
            ..rate_defaults
        },
        mail: MailConfig {
            account: env_opt("EMAIL_USER").unwrap_or_default(),
            secret: env_opt("EMAIL_PASS").unwrap_or_default(),
            smtp_host: env_or("SMTP_HOST", mail_defaults.smtp_host),
            smtp_port: env_or("SMTP_PORT", mail_defaults.smtp_port),
            owner_address: env_opt("OWNER_ADDRESS"),
            signature: env_opt("SIGNATURE"),
            auto_reply: env_or("AUTO_REPLY", mail_defaults.auto_reply),
            dry_run: env_or("MAIL_DRY_RUN", false),
            ..mail_defaults
        },
        metrics: portfolio_contact::config::MetricsConfig {
            enabled: env_or("METRICS_ENABLED", true),
            ..Default::default()
        },
    }
}
