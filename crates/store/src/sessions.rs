//! Session store interface

use async_trait::async_trait;
use chrono::Duration;

use nano_core::SessionRecord;

use crate::Result;

/// Closure applied to a session record under the store's write lock.
pub type SessionMutation = Box<dyn FnOnce(&mut SessionRecord) + Send>;

/// Session store collaborator.
///
/// The store is the source of truth for session state; any in-process map is
/// a cache at most. `update` must be an atomic read-modify-write for a single
/// session so that concurrent requests for the same session cannot lose
/// verification counter increments.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a fresh, unverified session.
    async fn create(&self, customer_id: Option<String>) -> Result<SessionRecord>;

    /// Fetch a session by id.
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>>;

    /// Replace a session record wholesale.
    async fn put(&self, record: SessionRecord) -> Result<()>;

    /// Atomically mutate a single session. Returns the updated record or
    /// `NotFound` when the session does not exist.
    async fn update(&self, session_id: &str, mutation: SessionMutation) -> Result<SessionRecord>;

    /// Mark a session terminated.
    async fn terminate(&self, session_id: &str) -> Result<()>;

    /// Mark sessions idle beyond `timeout` as expired. Returns how many
    /// sessions were expired by this sweep.
    async fn expire_idle(&self, timeout: Duration) -> Result<usize>;
}
