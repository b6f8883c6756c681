// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Portfolio Contact Relay
//!
//! Backend for the portfolio contact form:
//!
//! - Per-client sliding window limit (5 submissions per 15 minutes default)
//! - Required field and email shape validation
//! - Owner notification with reply-to set to the submitter
//! - Auto-reply to the submitter
//! - JSON success/failure envelope, CORS preflight, health and metrics

pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod relay;
pub mod validator;

pub use config::Config;
pub use error::ContactError;
pub use handlers::{router, AppState};
pub use limiter::{RateLimitResult, RateLimiter};
pub use mailer::{MailSender, OutboundEmail};
pub use relay::MailRelay;
pub use validator::{Submission, SubmissionValidator, ValidationResult};
