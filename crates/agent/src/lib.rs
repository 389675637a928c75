//! NANO banking assistant core
//!
//! Turns raw customer messages into banking actions:
//! - [`entity`] - regex entity extraction (account numbers, names, contacts)
//! - [`intent`] - keyword intent classification over nine fixed categories
//! - [`verification`] - the two-factor identity verification state machine
//! - [`dialogue`] - routing rules and the response envelope
//! - [`support`] - knowledge base, escalation tickets, session summaries
//! - [`agent`] - [`BankingAgent`], the orchestrator the server talks to
//!
//! All persistence goes through the `nano-store` collaborator traits; the
//! agent itself holds no state beyond configuration.

pub mod agent;
pub mod dialogue;
pub mod entity;
pub mod intent;
pub mod support;
pub mod verification;

pub use agent::BankingAgent;
pub use dialogue::{AgentResponse, Route};
pub use entity::{extract, ExtractedEntities, UpdateField};
pub use intent::{classify, Classification};
pub use support::{EscalationPriority, EscalationTicket, SessionSummary, SupportTools};
pub use verification::{VerificationMachine, VerificationStep};
