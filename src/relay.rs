// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Mail relay for accepted submissions.
//!
//! A relay sends the owner notification first and the auto-reply second,
//! awaiting each in turn. A failure at either step fails the relay as a
//! whole; the caller never learns that the notification went out when the
//! auto-reply did not. Nothing is retried.

use crate::config::MailConfig;
use crate::mailer::{MailError, MailSender, OutboundEmail};
use crate::validator::ValidSubmission;
use html_escape::encode_text;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const AUTO_REPLY_SUBJECT: &str = "Thank you for contacting me!";

/// Which of the two messages a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Notification,
    AutoReply,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notification => write!(f, "owner notification"),
            Self::AutoReply => write!(f, "auto-reply"),
        }
    }
}

/// Relay failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Credentials missing or the transport could not be verified
    #[error("Mail configuration error: {0}")]
    Configuration(String),

    /// A send attempt failed
    #[error("Failed to send {kind}: {source}")]
    Transport { kind: MessageKind, source: MailError },

    /// The submitter's address passed validation but the transport refused it
    #[error("Cannot send {kind} to submitter: {source}")]
    RejectedAddress { kind: MessageKind, source: MailError },
}

impl RelayError {
    fn from_send(kind: MessageKind, source: MailError, submitter: &str) -> Self {
        match &source {
            MailError::InvalidAddress { address, .. } if address == submitter => {
                Self::RejectedAddress { kind, source }
            }
            _ => Self::Transport { kind, source },
        }
    }
}

/// Sends the notification and auto-reply for one submission.
#[derive(Clone)]
pub struct MailRelay {
    sender: Arc<dyn MailSender>,
    config: MailConfig,
}

impl MailRelay {
    pub fn new(sender: Arc<dyn MailSender>, config: MailConfig) -> Self {
        Self { sender, config }
    }

    /// Relay a validated submission.
    pub async fn relay(&self, submission: &ValidSubmission<'_>) -> Result<(), RelayError> {
        self.preflight().await?;

        let notification = self.notification(submission);
        debug!(to = %notification.to, "Sending owner notification");
        self.sender.send(notification).await.map_err(|source| {
            RelayError::from_send(MessageKind::Notification, source, submission.email)
        })?;

        if self.config.auto_reply {
            let reply = self.auto_reply(submission);
            debug!(to = %reply.to, "Sending auto-reply");
            self.sender.send(reply).await.map_err(|source| {
                RelayError::from_send(MessageKind::AutoReply, source, submission.email)
            })?;
        }

        info!(reply_to = %submission.email, "Submission relayed");
        Ok(())
    }

    async fn preflight(&self) -> Result<(), RelayError> {
        if !self.config.dry_run && !self.config.has_credentials() {
            warn!("Mail account or secret is not set");
            return Err(RelayError::Configuration(
                "mail account or secret is not set".to_string(),
            ));
        }

        if self.config.verify_before_send {
            self.sender
                .verify()
                .await
                .map_err(|e| RelayError::Configuration(e.to_string()))?;
        }

        Ok(())
    }

    /// Message to the site owner, replying to the submitter.
    pub fn notification(&self, submission: &ValidSubmission<'_>) -> OutboundEmail {
        let name = encode_text(submission.name);
        let email = encode_text(submission.email);
        let message = encode_text(submission.message);
        let sent_at = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");

        let html_body = format!(
            r#"<div style="font-family: Arial, sans-serif; padding: 20px; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">New Contact Form Submission</h2>
  <div style="background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin: 20px 0;">
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> {email}</p>
  </div>
  <div style="background-color: #fff; padding: 15px; border-left: 4px solid #007bff;">
    <h3 style="margin-top: 0;">Message:</h3>
    <p style="white-space: pre-wrap;">{message}</p>
  </div>
  <hr style="margin: 20px 0; border: none; border-top: 1px solid #ddd;">
  <p style="color: #666; font-size: 12px;">Sent from your portfolio contact form at {sent_at}.</p>
</div>"#
        );

        OutboundEmail {
            from: self.config.account.clone(),
            to: self.config.owner().to_string(),
            reply_to: Some(submission.email.to_string()),
            subject: format!("Portfolio Contact: Message from {}", submission.name),
            html_body,
        }
    }

    /// Acknowledgment to the submitter echoing their message.
    pub fn auto_reply(&self, submission: &ValidSubmission<'_>) -> OutboundEmail {
        let name = encode_text(submission.name);
        let message = encode_text(submission.message);
        let closing = match &self.config.signature {
            Some(signature) => format!("<p>Best regards,<br>{}</p>", encode_text(signature)),
            None => "<p>Best regards</p>".to_string(),
        };

        let html_body = format!(
            r#"<div style="font-family: Arial, sans-serif; padding: 20px; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">Thank you for reaching out, {name}!</h2>
  <p>I've received your message and will get back to you as soon as possible.</p>
  <div style="background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin: 20px 0;">
    <p><strong>Your message:</strong></p>
    <p style="white-space: pre-wrap;">{message}</p>
  </div>
  {closing}
  <hr style="margin: 20px 0; border: none; border-top: 1px solid #ddd;">
  <p style="color: #666; font-size: 12px;">This is an automated response. Please do not reply to this email.</p>
</div>"#
        );

        let subject = match &self.config.signature {
            Some(signature) => format!("{AUTO_REPLY_SUBJECT} - {signature}"),
            None => AUTO_REPLY_SUBJECT.to_string(),
        };

        OutboundEmail {
            from: self.config.account.clone(),
            to: submission.email.to_string(),
            reply_to: None,
            subject,
            html_body,
        }
    }
}
