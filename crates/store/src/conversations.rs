//! Conversation transcript store interface

use async_trait::async_trait;
use chrono::Duration;

use nano_core::Turn;

use crate::Result;

/// Append-only conversation log collaborator.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append a turn to a session's transcript.
    async fn append_turn(&self, session_id: &str, turn: Turn) -> Result<()>;

    /// Turns for a session within the given look-back window, oldest first.
    async fn recent_turns(&self, session_id: &str, window: Duration) -> Result<Vec<Turn>>;
}
