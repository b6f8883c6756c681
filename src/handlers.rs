// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact service.
//!
//! A submission passes the limiter first, then the validator, then the
//! relay. Every outcome is reported with the same JSON envelope.
//!
//! `OPTIONS` requests never reach a handler: the CORS layer answers every
//! preflight with 200 and the permissive allow headers.

use crate::config::Config;
use crate::error::{ContactError, Result};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::mailer::MailSender;
use crate::metrics::ContactMetrics;
use crate::relay::MailRelay;
use crate::validator::{Submission, SubmissionValidator};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

const SUCCESS_MESSAGE: &str = "Message sent successfully! Check your email for confirmation.";

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub validator: SubmissionValidator,
    pub relay: MailRelay,
    pub metrics: ContactMetrics,
    pub config: Config,
}

/// Response envelope for the contact endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

impl AppState {
    /// Wire the pipeline for a config and mail transport.
    pub fn new(
        config: Config,
        limiter: RateLimiter,
        sender: Arc<dyn MailSender>,
        metrics: ContactMetrics,
    ) -> Self {
        Self {
            relay: MailRelay::new(sender, config.mail.clone()),
            validator: SubmissionValidator::new(),
            limiter,
            metrics,
            config,
        }
    }

    /// Consume one slot of the client's window.
    pub fn admit(&self, client: &str) -> Result<()> {
        let result = self.limiter.check(client);
        self.metrics.set_tracked_clients(self.limiter.tracked_clients());

        match result {
            RateLimitResult::Allowed { remaining, .. } => {
                debug!(client = %client, remaining, "Submission admitted");
                Ok(())
            }
            RateLimitResult::Limited { retry_after } => Err(ContactError::RateLimited { retry_after }),
        }
    }

    /// Validate and relay an admitted submission.
    pub async fn deliver(&self, submission: &Submission) -> Result<()> {
        let accepted = self.validator.accept(submission)?;
        self.relay.relay(&accepted).await?;
        Ok(())
    }

    /// Identify the client for rate limiting.
    pub fn client_id(&self, peer: Option<SocketAddr>, headers: &HeaderMap) -> String {
        if self.config.trust_forwarded_for {
            let forwarded = headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(client) = forwarded {
                return client.to_string();
            }
        }

        peer.map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Build the router for the service.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let mut app = Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/contact", post(contact).fallback(method_not_allowed));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Portfolio contact API is running".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Contact form submission.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: std::result::Result<Json<Submission>, JsonRejection>,
) -> Response {
    let client = state.client_id(peer.map(|ConnectInfo(addr)| addr), &headers);

    match process(&state, &client, body).await {
        Ok(()) => {
            state.metrics.record("sent");
            (
                StatusCode::OK,
                Json(ContactResponse {
                    success: true,
                    message: SUCCESS_MESSAGE.to_string(),
                    error: None,
                }),
            )
                .into_response()
        }
        Err(err) => {
            err.log(&client);
            state.metrics.record(err.outcome());
            err.to_response(state.config.is_development())
        }
    }
}

async fn process(
    state: &AppState,
    client: &str,
    body: std::result::Result<Json<Submission>, JsonRejection>,
) -> Result<()> {
    state.admit(client)?;
    let Json(submission) = body.map_err(|e| ContactError::MalformedBody(e.body_text()))?;
    state.deliver(&submission).await
}

/// Any other verb on the contact endpoint.
pub async fn method_not_allowed(State(state): State<Arc<AppState>>) -> Response {
    let err = ContactError::MethodNotAllowed;
    state.metrics.record(err.outcome());
    err.into_response()
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
