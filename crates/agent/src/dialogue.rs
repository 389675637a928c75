//! Dialogue routing
//!
//! Pure decision layer between classification and execution. Given the
//! session state, the classified intent and the extracted entities, pick a
//! route; the agent executes it against the stores. Keeping this free of
//! side effects makes the precedence rules directly testable.
//!
//! Precedence, highest first:
//! 1. an in-flight security challenge consumes the message;
//! 2. a pending credentials request plus credential-looking input forces
//!    identity verification;
//! 3. greeting and escalation short-circuit regardless of verification;
//! 4. sensitive intents gate on a verified session;
//! 5. everything else routes by intent.

use serde::{Deserialize, Serialize};

use nano_core::{AwaitingInput, IntentKind, SessionRecord, VerificationState};

use crate::entity::ExtractedEntities;
use crate::intent::Classification;

/// Chosen handling path for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Greeting,
    Escalation,
    /// Security answer for the pending challenge
    SecurityAnswer,
    /// First-factor credential submission
    Credentials,
    /// Sensitive intent from an unverified session; verification comes first
    VerificationRequired(IntentKind),
    /// Operation on behalf of a verified customer
    VerifiedOperation(IntentKind),
    /// Knowledge base lookup
    Support,
    /// Nothing routable; ask for clarification
    Clarify,
}

/// Pick the route for a message.
pub fn route(
    session: &SessionRecord,
    classification: &Classification,
    entities: &ExtractedEntities,
    message: &str,
) -> Route {
    let intent = classification.intent;
    let has_credentials = entities.full_name.is_some() && entities.account_number.is_some();

    // An open challenge consumes the message as the answer, unless the
    // customer is restarting with a fresh name/account pair.
    if session.verification == VerificationState::AwaitingSecurityAnswer && session.pending.is_some()
    {
        if has_credentials {
            return Route::Credentials;
        }
        return Route::SecurityAnswer;
    }

    // We asked for credentials on the previous turn; anything that looks
    // like them goes to verification even if the classifier disagrees.
    if session.awaiting == Some(AwaitingInput::Credentials)
        && (entities.account_number.is_some() || message.to_lowercase().contains("name"))
    {
        return Route::Credentials;
    }

    if intent == IntentKind::Greeting {
        return Route::Greeting;
    }
    if intent == IntentKind::Escalation {
        return Route::Escalation;
    }

    if intent.is_sensitive() && !session.is_verified() {
        return Route::VerificationRequired(intent);
    }

    if intent == IntentKind::IdentityVerification
        || (!session.is_verified() && entities.account_number.is_some())
    {
        return Route::Credentials;
    }

    if session.is_verified() && session.customer_id.is_some() {
        return Route::VerifiedOperation(intent);
    }

    if intent == IntentKind::GeneralSupport {
        return Route::Support;
    }

    Route::Clarify
}

/// Wire response for one processed message.
///
/// Field set mirrors the chat endpoint contract; optional flags are omitted
/// from the JSON when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub response: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_verification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_security_question: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tools_used: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_new_session: Option<bool>,
}

impl AgentResponse {
    pub fn text(session_id: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            session_id: session_id.into(),
            requires_verification: None,
            requires_security_question: None,
            verified: None,
            customer_id: None,
            escalation_id: None,
            tools_used: Vec::new(),
            error: None,
            requires_new_session: None,
        }
    }

    pub fn with_tool(mut self, tool: &str) -> Self {
        self.tools_used.push(tool.to_string());
        self
    }

    pub fn requires_verification(mut self) -> Self {
        self.requires_verification = Some(true);
        self
    }

    pub fn requires_security_question(mut self) -> Self {
        self.requires_security_question = Some(true);
        self
    }

    pub fn verified(mut self, customer_id: impl Into<String>) -> Self {
        self.verified = Some(true);
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn requires_new_session(mut self) -> Self {
        self.requires_new_session = Some(true);
        self
    }
}

/// Canned response text shared between the agent and its tests.
pub mod messages {
    pub const SESSION_EXPIRED: &str =
        "Your session has timed out for security reasons. Please start a new conversation.";
    pub const SESSION_UNKNOWN: &str =
        "I'm sorry, your session has expired. Please start a new conversation.";
    pub const VERIFICATION_REQUEST: &str = "I'd be happy to help with that! First, I need to \
        verify your identity for security purposes. Please provide your full name and account \
        number.";
    pub const CREDENTIALS_PROMPT: &str = "To verify your identity, I need your full name and \
        account number. Please provide both in your message.";
    pub const CUSTOMER_NOT_FOUND: &str =
        "Customer information not found. Please check your details or visit a branch.";
    pub const ACCOUNT_INACTIVE: &str = "Account is not active. Please contact customer service.";
    pub const LOCKED_OUT: &str = "Too many failed verification attempts. Please visit a branch.";
    pub const NO_RECENT_TRANSACTIONS: &str =
        "I don't see any recent transactions on your account.";
    pub const FILE_MANAGEMENT: &str = "I can help with document management. Would you like to \
        upload a document, view your existing documents, or organize your files?";
    pub const DOCUMENT_OCR: &str = "I can help you process documents using OCR technology to \
        extract text and banking information. Please upload your document (PDF, image, or scan) \
        and I'll analyze it for you. What type of document would you like me to process?";
    pub const UPDATE_PROMPT: &str = "I can help update your contact information. What would you \
        like to change - your email, phone number, or address? Please provide the new \
        information.";
    pub const SUPPORT_DETAILS_PROMPT: &str =
        "I'd be happy to help! Could you please provide more details about what you're looking \
         for?";
    pub const VERIFIED_FALLBACK: &str = "I'm here to help with your banking needs. You can ask \
        about your balance, transaction history, update your information, or get general banking \
        assistance.";
    pub const CLARIFY: &str = "I understand you need assistance. Could you please provide more \
        specific information about how I can help you today?";
    pub const TECHNICAL_DIFFICULTIES: &str = "I apologize, but I'm experiencing technical \
        difficulties. Please try again or contact customer service.";
}
