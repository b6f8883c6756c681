// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact submission validator.
//!
//! Two rules, checked in order:
//! - name, email and message are present and not blank
//! - email has the `local@domain.tld` shape
//!
//! Values are never rewritten; what passes is forwarded as received.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// One contact form payload.
///
/// Fields are optional at the wire level so that a missing field is a
/// validation failure rather than a body rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Submission {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            message: Some(message.into()),
        }
    }
}

/// A submission that passed validation, borrowing the raw values.
#[derive(Debug, Clone, Copy)]
pub struct ValidSubmission<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide all required fields (name, email, message)")]
    MissingFields,

    #[error("Please provide a valid email address")]
    InvalidEmail,
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Submission is valid
    Valid,
    /// Submission is invalid
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

/// Contact submission validator. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionValidator;

impl SubmissionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check that an address has the `local@domain.tld` shape.
    pub fn validate_email(&self, email: &str) -> ValidationResult {
        if email_pattern().is_match(email) {
            ValidationResult::Valid
        } else {
            debug!(email = %email, "Email address rejected");
            ValidationResult::Invalid(ValidationError::InvalidEmail)
        }
    }

    /// Validate a complete submission.
    pub fn validate(&self, submission: &Submission) -> ValidationResult {
        match self.accept(submission) {
            Ok(_) => ValidationResult::Valid,
            Err(err) => ValidationResult::Invalid(err),
        }
    }

    /// Validate and borrow the accepted fields.
    pub fn accept<'a>(&self, submission: &'a Submission) -> Result<ValidSubmission<'a>, ValidationError> {
        let (Some(name), Some(email), Some(message)) = (
            present(&submission.name),
            present(&submission.email),
            present(&submission.message),
        ) else {
            debug!("Submission is missing required fields");
            return Err(ValidationError::MissingFields);
        };

        if let ValidationResult::Invalid(err) = self.validate_email(email) {
            return Err(err);
        }

        Ok(ValidSubmission {
            name,
            email,
            message,
        })
    }
}
