//! Error taxonomy
//!
//! `NotFound` and `Verification` are recovered into conversational responses by
//! the agent and never surface to the HTTP caller. `Downstream` becomes a
//! generic apology while the underlying fault is logged. Nothing is retried
//! automatically.

use thiserror::Error;

/// Core error taxonomy
#[derive(Error, Debug)]
pub enum Error {
    /// Customer or session lookup miss
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed entity, e.g. an unparseable account number
    #[error("validation failure: {0}")]
    Validation(String),

    /// Wrong credentials or security answer
    #[error("verification failure: {0}")]
    Verification(String),

    /// Verification attempt budget exhausted
    #[error("verification attempts exhausted")]
    LockedOut,

    /// Store collaborator failure
    #[error("downstream unavailable: {0}")]
    Downstream(String),
}

impl Error {
    /// True when the error should be folded into a conversational reply
    /// rather than propagated.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Verification(_) | Error::LockedOut
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
