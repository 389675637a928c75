//! Audit store interface

use async_trait::async_trait;

use nano_core::AuditEvent;

use crate::Result;

/// Append-only audit trail collaborator.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append an event to the trail.
    async fn append(&self, event: AuditEvent) -> Result<()>;

    /// All events for a session, oldest first.
    async fn events_for_session(&self, session_id: &str) -> Result<Vec<AuditEvent>>;
}
