//! Core types for the NANO banking assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Session and verification state
//! - Customer and transaction records
//! - Conversation turns and metadata
//! - Audit trail events
//! - Error taxonomy

pub mod audit;
pub mod conversation;
pub mod customer;
pub mod error;
pub mod intent;
pub mod session;

pub use audit::{AuditEvent, AuditOutcome};
pub use conversation::{Turn, TurnMetadata, TurnRole};
pub use customer::{
    AccountStatus, ContactUpdate, CustomerRecord, TransactionKind, TransactionRecord,
    TransactionStatus,
};
pub use error::{Error, Result};
pub use intent::IntentKind;
pub use session::{
    AwaitingInput, SessionRecord, SessionStatus, VerificationAttempt, VerificationState,
};
