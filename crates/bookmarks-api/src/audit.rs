//! Security audit logging for authentication events
//!
//! Events are logged at INFO level with the "audit" target so they can be
//! filtered and routed separately from ordinary request logs. Passwords and
//! tokens never appear in an event.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::info;

/// Caller metadata attached to audit events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip_address: extract_ip_address(headers),
            user_agent: extract_user_agent(headers),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Security audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    SignupSuccess {
        user_id: i64,
        email: String,
        client: ClientInfo,
    },

    /// Signup refused by the store (email already taken)
    SignupRejected {
        email: String,
        reason: String,
        client: ClientInfo,
    },

    LoginSuccess {
        user_id: i64,
        email: String,
        client: ClientInfo,
    },

    /// Failed login; `reason` tells unknown email from wrong password and
    /// is only ever written to the log
    LoginFailure {
        email: String,
        reason: String,
        client: ClientInfo,
    },

    /// Bad, expired, or orphaned bearer token
    InvalidToken {
        reason: String,
        client: ClientInfo,
    },

    ProfileUpdated {
        user_id: i64,
        email_changed: bool,
        client: ClientInfo,
    },
}

impl AuditEvent {
    fn summary(&self) -> &'static str {
        match self {
            AuditEvent::SignupSuccess { .. } => "Signup successful",
            AuditEvent::SignupRejected { .. } => "Signup rejected",
            AuditEvent::LoginSuccess { .. } => "Login successful",
            AuditEvent::LoginFailure { .. } => "Login failed",
            AuditEvent::InvalidToken { .. } => "Invalid token presented",
            AuditEvent::ProfileUpdated { .. } => "Profile updated",
        }
    }
}

/// Log an audit event
pub fn audit_log(event: &AuditEvent) {
    let timestamp = Utc::now();

    // Serialize event to JSON for structured logging
    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    info!(
        target: "audit",
        timestamp = %timestamp,
        event = %event_json,
        "{}",
        event.summary()
    );
}

/// Client address, preferring proxy headers
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    // X-Forwarded-For may hold a chain; the first hop is the client
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return Some(ip.to_string());
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
