//! Audit logging for security and compliance.
//!
//! Structured audit events for security-relevant actions: authentication,
//! authorization decisions, and data mutations.
//!
//! # Example
//! ```ignore
//! use axum_helpers::audit::{AuditEvent, AuditOutcome};
//!
//! AuditEvent::new(
//!     Some(user.id.to_string()),
//!     "project.delete",
//!     Some(format!("project:{}", id)),
//!     AuditOutcome::Success,
//! )
//! .with_ip(extract_ip_from_headers(&headers))
//! .with_user_agent(extract_user_agent(&headers))
//! .log();
//! ```

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of an audited action.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// Action completed successfully
    Success,
    /// Action failed (e.g., validation error, system error)
    Failure,
    /// Action was denied (e.g., insufficient permissions)
    Denied,
}

/// Structured audit event for security and compliance logging.
///
/// Build with the fluent setters, then call `.log()` to emit the event to
/// the `audit` target.
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    /// User who performed the action (if authenticated)
    pub user_id: Option<String>,
    /// Action performed (e.g., "user.login", "project.delete")
    pub action: String,
    /// Resource affected (e.g., "project:123")
    pub resource: Option<String>,
    /// Outcome of the action
    pub outcome: AuditOutcome,
    /// Client IP address
    pub ip_address: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Timestamp when the event occurred
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    /// Additional details about the event (JSON)
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        user_id: Option<String>,
        action: impl Into<String>,
        resource: Option<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            user_id,
            action: action.into(),
            resource,
            outcome,
            ip_address: None,
            user_agent: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Add additional details, serialized to JSON.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Emit the audit event to the audit log.
    ///
    /// Logs to the "audit" target with structured fields; route the target to
    /// a separate sink in the logging backend if audit retention differs.
    pub fn log(self) {
        tracing::info!(
            target: "audit",
            user_id = self.user_id,
            action = %self.action,
            resource = self.resource,
            outcome = ?self.outcome,
            ip = self.ip_address,
            user_agent = self.user_agent,
            "{}",
            serde_json::to_string(&self)
                .unwrap_or_else(|_| "Failed to serialize audit event".to_string())
        );
    }
}

/// Extract client IP address from HTTP headers.
///
/// Checks X-Forwarded-For (first hop) and falls back to X-Real-IP, covering
/// deployments behind a proxy or load balancer.
pub fn extract_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}

/// Extract the User-Agent header value.
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("10.0.0.1, 10.0.0.2"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.3"));

        assert_eq!(extract_ip_from_headers(&headers), Some("10.0.0.1".to_string()));
    }

    #[test]
    fn test_extract_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.3"));

        assert_eq!(extract_ip_from_headers(&headers), Some("10.0.0.3".to_string()));
    }

    #[test]
    fn test_extract_ip_missing() {
        assert_eq!(extract_ip_from_headers(&HeaderMap::new()), None);
    }
}
