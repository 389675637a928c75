//! Storage collaborators for the NANO banking assistant
//!
//! The core never talks to a database directly. It goes through the four
//! trait-based collaborators in this crate:
//! - [`CustomerStore`] - customer records, balances, transactions
//! - [`SessionStore`] - session metadata and verification state
//! - [`AuditStore`] - append-only audit trail
//! - [`ConversationStore`] - append-only conversation transcript
//!
//! The in-memory implementations are the reference backends and double as
//! test fixtures. A SQL-backed implementation would slot in behind the same
//! traits; the wire protocol is explicitly out of scope here.

pub mod audit;
pub mod conversations;
pub mod customers;
pub mod memory;
pub mod sessions;

pub use audit::AuditStore;
pub use conversations::ConversationStore;
pub use customers::CustomerStore;
pub use memory::{
    InMemoryAuditStore, InMemoryConversationStore, InMemoryCustomerStore, InMemorySessionStore,
};
pub use sessions::{SessionMutation, SessionStore};

use thiserror::Error;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for nano_core::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => nano_core::Error::NotFound(what),
            StoreError::Unavailable(why) => nano_core::Error::Downstream(why),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
