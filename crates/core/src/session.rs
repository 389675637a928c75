//! Session state
//!
//! A session is a bounded conversational context identified by an opaque
//! token. Verification progress lives here and never outlives the session:
//! a new session always starts `Unverified`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::IntentKind;

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Expired,
    Terminated,
}

/// Verification progress for a session
///
/// Lockout is not a fourth state: it is the attempt budget on
/// [`VerificationAttempt`] being exhausted, which drops the session back to
/// `Unverified`. `Verified` is terminal for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    #[default]
    Unverified,
    AwaitingSecurityAnswer,
    Verified,
}

/// Explicit tag for what the assistant asked for on its last turn.
///
/// Replaces re-parsing the previous assistant message to detect a pending
/// credential prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwaitingInput {
    /// Full name and account number were requested
    Credentials,
}

/// Transient verification attempt held in the session while the two-factor
/// challenge is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationAttempt {
    /// Candidate full name as given by the customer
    pub full_name: String,
    /// Candidate account number
    pub account_number: String,
    /// Customer matched by name+account, pending the security answer
    pub customer_id: String,
    /// Failed security answers this episode; the budget is enforced by the
    /// verification machine from configuration
    pub attempts: u8,
}

impl VerificationAttempt {
    pub fn new(
        full_name: impl Into<String>,
        account_number: impl Into<String>,
        customer_id: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            account_number: account_number.into(),
            customer_id: customer_id.into(),
            attempts: 0,
        }
    }
}

/// Persisted session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque session token (UUIDv4)
    pub session_id: String,
    /// Customer bound to this session once verified
    pub customer_id: Option<String>,
    /// Verification progress
    pub verification: VerificationState,
    /// In-flight verification attempt, if any
    pub pending: Option<VerificationAttempt>,
    /// Sensitive intent remembered for resumption after verification
    pub next_intent: Option<IntentKind>,
    /// What the assistant asked for on its last turn
    pub awaiting: Option<AwaitingInput>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub status: SessionStatus,
}

impl SessionRecord {
    /// Create a fresh, unverified session.
    pub fn new(customer_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            customer_id,
            verification: VerificationState::Unverified,
            pending: None,
            next_intent: None,
            awaiting: None,
            created_at: now,
            last_activity: now,
            status: SessionStatus::Active,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.verification == VerificationState::Verified
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Update the activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// True when the session has been idle longer than `timeout`.
    pub fn is_idle_beyond(&self, timeout: Duration) -> bool {
        Utc::now() - self.last_activity > timeout
    }

    /// Bind a verified customer to the session. Clears any pending attempt.
    pub fn mark_verified(&mut self, customer_id: impl Into<String>) {
        self.verification = VerificationState::Verified;
        self.customer_id = Some(customer_id.into());
        self.pending = None;
        self.awaiting = None;
    }

    /// Drop back to unverified, clearing attempt data.
    pub fn reset_verification(&mut self) {
        self.verification = VerificationState::Unverified;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_unverified() {
        let session = SessionRecord::new(None);
        assert_eq!(session.verification, VerificationState::Unverified);
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.pending.is_none());
        assert!(!session.session_id.is_empty());
    }

    #[test]
    fn test_mark_verified_clears_pending() {
        let mut session = SessionRecord::new(None);
        session.pending = Some(VerificationAttempt::new("John Doe", "1234567890", "cust-1"));
        session.verification = VerificationState::AwaitingSecurityAnswer;

        session.mark_verified("cust-1");

        assert!(session.is_verified());
        assert_eq!(session.customer_id.as_deref(), Some("cust-1"));
        assert!(session.pending.is_none());
    }

    #[test]
    fn test_idle_check() {
        let mut session = SessionRecord::new(None);
        session.last_activity = Utc::now() - Duration::minutes(45);
        assert!(session.is_idle_beyond(Duration::minutes(30)));
        assert!(!session.is_idle_beyond(Duration::minutes(60)));
    }
}
