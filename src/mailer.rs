// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound mail capability.
//!
//! The relay only needs two operations from a transport: confirm that it
//! is usable, and send one HTML message. `SmtpMailer` talks to a real SMTP
//! relay with an authenticated account, `LogMailer` only logs (dry runs),
//! and `RecordingMailer` keeps messages in memory for tests.

use crate::config::MailConfig;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

/// Mail transport errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailError {
    #[error("Mail transport is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid mailbox {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// One outbound HTML message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html_body: String,
}

/// A transport able to deliver `OutboundEmail`s.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Confirm credentials are present and the transport is reachable.
    async fn verify(&self) -> Result<(), MailError>;

    /// Deliver one message.
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Build a lettre message from an outbound email.
pub fn build_message(email: &OutboundEmail) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(mailbox(&email.from)?)
        .to(mailbox(&email.to)?)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_HTML);

    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(mailbox(reply_to)?);
    }

    builder
        .body(email.html_body.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

/// SMTP transport authenticated with a single account.
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    host: String,
}

impl SmtpMailer {
    /// Create the transport. Missing credentials do not fail here; they
    /// surface from `verify` and `send` so the service can still start and
    /// answer health checks.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        if !config.has_credentials() {
            return Ok(Self {
                transport: None,
                host: config.smtp_host.clone(),
            });
        }

        // 465 is implicit TLS, anything else negotiates STARTTLS
        let builder = if config.smtp_port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        }
        .map_err(|e| MailError::NotConfigured(format!("SMTP relay {}: {e}", config.smtp_host)))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(config.account.clone(), config.secret.clone()))
            .build();

        Ok(Self {
            transport: Some(transport),
            host: config.smtp_host.clone(),
        })
    }

    fn transport(&self) -> Result<&AsyncSmtpTransport<Tokio1Executor>, MailError> {
        self.transport
            .as_ref()
            .ok_or_else(|| MailError::NotConfigured("missing account or secret".to_string()))
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn verify(&self) -> Result<(), MailError> {
        let transport = self.transport()?;
        match transport.test_connection().await {
            Ok(true) => {
                debug!(host = %self.host, "SMTP transport verified");
                Ok(())
            }
            Ok(false) => Err(MailError::NotConfigured(format!(
                "SMTP relay {} rejected the connection test",
                self.host
            ))),
            Err(e) => Err(MailError::NotConfigured(format!("SMTP relay {}: {e}", self.host))),
        }
    }

    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let transport = self.transport()?;
        let message = build_message(&email)?;
        let response = transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        debug!(to = %email.to, code = %response.code(), "Message accepted by relay");
        Ok(())
    }
}

/// Dry-run sender.
///
/// Parses the recipient and reply-to mailboxes so address errors still
/// surface, logs the message, and drops it. Only a running count is kept.
/// The sender account may be unset in a dry run.
#[derive(Debug, Default)]
pub struct LogMailer {
    delivered: AtomicUsize,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far.
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MailSender for LogMailer {
    async fn verify(&self) -> Result<(), MailError> {
        Ok(())
    }

    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        mailbox(&email.to)?;
        if let Some(reply_to) = &email.reply_to {
            mailbox(reply_to)?;
        }
        self.delivered.fetch_add(1, Ordering::Relaxed);
        info!(
            to = %email.to,
            reply_to = email.reply_to.as_deref().unwrap_or(""),
            subject = %email.subject,
            body_bytes = email.html_body.len(),
            "Dry run, message not sent"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Recorded {
    sent: Vec<OutboundEmail>,
    attempts: usize,
}

/// In-memory sender for tests.
///
/// Records every message it is asked to send. It can be told to fail the
/// n-th send attempt or to fail verification, which is how the relay's
/// failure paths are exercised. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    record: Arc<Mutex<Recorded>>,
    fail_on_attempt: Option<usize>,
    fail_verify: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given send attempt (1-based).
    pub fn failing_on(attempt: usize) -> Self {
        Self {
            fail_on_attempt: Some(attempt),
            ..Self::default()
        }
    }

    /// Fail every `verify` call.
    pub fn unverifiable() -> Self {
        Self {
            fail_verify: true,
            ..Self::default()
        }
    }

    /// Messages delivered so far.
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.record.lock().unwrap_or_else(|e| e.into_inner()).sent.clone()
    }

    /// Send attempts so far, including failed ones.
    pub fn attempts(&self) -> usize {
        self.record.lock().unwrap_or_else(|e| e.into_inner()).attempts
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn verify(&self) -> Result<(), MailError> {
        if self.fail_verify {
            return Err(MailError::NotConfigured("verification disabled".to_string()));
        }
        Ok(())
    }

    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let mut record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        record.attempts += 1;
        if self.fail_on_attempt == Some(record.attempts) {
            return Err(MailError::Transport(format!(
                "simulated failure on attempt {}",
                record.attempts
            )));
        }
        debug!(to = %email.to, subject = %email.subject, "Recorded outbound message");
        record.sent.push(email);
        Ok(())
    }
}
