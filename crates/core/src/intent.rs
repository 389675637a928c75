//! Intent categories
//!
//! The fixed category set the classifier ranks over. `GeneralInquiry` is the
//! fallback when no keyword matches and is never scored directly.

use serde::{Deserialize, Serialize};

/// Inferred purpose of a customer message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Greeting,
    IdentityVerification,
    BalanceInquiry,
    TransactionHistory,
    UpdateInformation,
    FileManagement,
    DocumentOcr,
    GeneralSupport,
    Escalation,
    /// Fallback when nothing matched
    GeneralInquiry,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Greeting => "greeting",
            IntentKind::IdentityVerification => "identity_verification",
            IntentKind::BalanceInquiry => "balance_inquiry",
            IntentKind::TransactionHistory => "transaction_history",
            IntentKind::UpdateInformation => "update_information",
            IntentKind::FileManagement => "file_management",
            IntentKind::DocumentOcr => "document_ocr",
            IntentKind::GeneralSupport => "general_support",
            IntentKind::Escalation => "escalation",
            IntentKind::GeneralInquiry => "general_inquiry",
        }
    }

    /// Intents that read or mutate customer data and therefore require a
    /// verified session.
    pub fn is_sensitive(&self) -> bool {
        matches!(
            self,
            IntentKind::BalanceInquiry
                | IntentKind::TransactionHistory
                | IntentKind::UpdateInformation
                | IntentKind::FileManagement
                | IntentKind::DocumentOcr
        )
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_set() {
        assert!(IntentKind::BalanceInquiry.is_sensitive());
        assert!(IntentKind::DocumentOcr.is_sensitive());
        assert!(!IntentKind::Greeting.is_sensitive());
        assert!(!IntentKind::Escalation.is_sensitive());
        assert!(!IntentKind::GeneralInquiry.is_sensitive());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&IntentKind::TransactionHistory).unwrap();
        assert_eq!(json, "\"transaction_history\"");
    }
}
