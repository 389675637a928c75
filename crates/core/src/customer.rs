//! Customer and transaction records
//!
//! These are owned by the account/record store; the core only reads and
//! writes them through the store traits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Suspended,
    Closed,
}

/// Customer record as held by the account store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub full_name: String,
    pub account_number: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub security_question: String,
    pub security_answer: String,
    pub balance: f64,
    pub status: AccountStatus,
    /// Failed verification attempts against this customer
    pub login_attempts: u32,
    pub last_login: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl CustomerRecord {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
        }
    }
}

/// Settlement state of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Completed,
    Pending,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Failed => "failed",
        }
    }
}

/// A single ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub customer_id: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub description: String,
    pub balance_after: f64,
    pub created_at: DateTime<Utc>,
    pub status: TransactionStatus,
}

/// Contact fields a customer may change through the assistant.
///
/// Only email, phone and address are updatable; everything else on the
/// customer record is off limits to conversational updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactUpdate {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ContactUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.address.is_none()
    }

    /// Names of the fields carried by this update.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.email.is_some() {
            fields.push("email");
        }
        if self.phone.is_some() {
            fields.push("phone");
        }
        if self.address.is_some() {
            fields.push("address");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_update_fields() {
        let update = ContactUpdate {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(update.field_names(), vec!["email"]);
        assert!(ContactUpdate::default().is_empty());
    }
}
