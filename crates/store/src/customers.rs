//! Customer store interface

use async_trait::async_trait;

use nano_core::{ContactUpdate, CustomerRecord, TransactionRecord};

use crate::Result;

/// Account/record store collaborator.
///
/// Owns customer records, balances and the transaction ledger. The core
/// reads and writes only through this interface.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Find a customer by name fragment (case-insensitive substring match)
    /// and exact account number. Returns `None` on a miss.
    async fn find_customer(
        &self,
        name_fragment: &str,
        account_number: &str,
    ) -> Result<Option<CustomerRecord>>;

    /// Fetch a customer by id.
    async fn get(&self, customer_id: &str) -> Result<Option<CustomerRecord>>;

    /// Compare a security answer against the stored one
    /// (case-insensitive, whitespace-trimmed).
    async fn check_security_answer(&self, customer_id: &str, answer: &str) -> Result<bool>;

    /// Bump the failed-verification counter. Returns the new count.
    async fn increment_login_failure(&self, customer_id: &str) -> Result<u32>;

    /// Clear the failed-verification counter and stamp a successful login.
    async fn reset_login_failure(&self, customer_id: &str) -> Result<()>;

    /// Current balance for a customer.
    async fn get_balance(&self, customer_id: &str) -> Result<f64>;

    /// Transactions for a customer within the last `days`, newest first,
    /// capped at `limit`.
    async fn list_transactions(
        &self,
        customer_id: &str,
        limit: usize,
        days: i64,
    ) -> Result<Vec<TransactionRecord>>;

    /// Apply contact field updates. Returns the names of the fields that
    /// were actually changed (only email/phone/address are updatable).
    async fn update_contact_fields(
        &self,
        customer_id: &str,
        updates: &ContactUpdate,
    ) -> Result<Vec<String>>;
}
