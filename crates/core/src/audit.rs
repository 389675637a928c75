//! Audit trail events
//!
//! Every verification transition and routed operation emits one of these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of an audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failed,
    Warning,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Success => "success",
            AuditOutcome::Failed => "failed",
            AuditOutcome::Warning => "warning",
        }
    }
}

/// A single audit trail entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub session_id: String,
    pub customer_id: Option<String>,
    pub action: String,
    pub details: String,
    pub outcome: AuditOutcome,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        session_id: impl Into<String>,
        customer_id: Option<String>,
        action: impl Into<String>,
        details: impl Into<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            customer_id,
            action: action.into(),
            details: details.into(),
            outcome,
            timestamp: Utc::now(),
        }
    }

    pub fn success(
        session_id: impl Into<String>,
        customer_id: Option<String>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::new(session_id, customer_id, action, details, AuditOutcome::Success)
    }

    pub fn failed(
        session_id: impl Into<String>,
        customer_id: Option<String>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::new(session_id, customer_id, action, details, AuditOutcome::Failed)
    }
}
