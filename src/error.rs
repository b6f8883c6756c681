// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the contact service and their HTTP mapping.

use crate::handlers::ContactResponse;
use crate::relay::RelayError;
use crate::validator::ValidationError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Everything that can stop a submission short of `Sent`.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Rate limit exceeded, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Submitter address refused: {0}")]
    RejectedAddress(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

impl From<RelayError> for ContactError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Configuration(reason) => ContactError::Configuration(reason),
            err @ RelayError::Transport { .. } => ContactError::Transport(err.to_string()),
            err @ RelayError::RejectedAddress { .. } => ContactError::RejectedAddress(err.to_string()),
        }
    }
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Configuration(_) | Self::Transport(_) | Self::RejectedAddress(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Label used for the outcome counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::MalformedBody(_) => "invalid",
            Self::RateLimited { .. } => "rate_limited",
            Self::Configuration(_) => "config_error",
            Self::Transport(_) | Self::RejectedAddress(_) => "failed",
            Self::MethodNotAllowed => "method_not_allowed",
        }
    }

    /// Text shown to the client.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::MalformedBody(_) => ValidationError::MissingFields.to_string(),
            Self::RateLimited { .. } => {
                "Too many requests from this IP, please try again later.".to_string()
            }
            Self::Configuration(_) => "Server configuration error. Please contact admin.".to_string(),
            Self::Transport(_) | Self::RejectedAddress(_) => {
                "Failed to send message. Please try again later.".to_string()
            }
            Self::MethodNotAllowed => "Method not allowed".to_string(),
        }
    }

    /// Emit a log line at a level matching the severity.
    pub fn log(&self, client: &str) {
        match self {
            Self::Configuration(reason) => {
                error!(kind = "configuration", client = %client, reason = %reason, "Contact relay misconfigured")
            }
            Self::Transport(reason) => {
                error!(kind = "transport", client = %client, reason = %reason, "Contact relay failed")
            }
            Self::RejectedAddress(reason) => {
                warn!(kind = "rejected_address", client = %client, reason = %reason, "Submitter address refused by mail transport")
            }
            Self::RateLimited { retry_after } => {
                warn!(client = %client, retry_after_secs = retry_after.as_secs(), "Submission rate limited")
            }
            other => info!(client = %client, error = %other, "Submission rejected"),
        }
    }

    /// Build the JSON error envelope. Server-side detail is only attached
    /// when `expose_detail` is set.
    pub fn to_response(&self, expose_detail: bool) -> Response {
        let detail = match self {
            Self::Configuration(reason) | Self::Transport(reason) | Self::RejectedAddress(reason)
                if expose_detail =>
            {
                Some(reason.clone())
            }
            _ => None,
        };

        let body = ContactResponse {
            success: false,
            message: self.public_message(),
            error: detail,
        };

        let mut response = (self.status(), Json(body)).into_response();
        match self {
            Self::RateLimited { retry_after } => {
                // Round up so clients never retry a moment too early
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
            }
            Self::MethodNotAllowed => {
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static("POST, OPTIONS"));
            }
            _ => {}
        }
        response
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        self.to_response(false)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ContactError>;
