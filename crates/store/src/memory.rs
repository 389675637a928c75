//! In-memory store backends
//!
//! Reference implementations of the collaborator traits, backed by
//! `parking_lot` locks. Per-session atomicity for `SessionStore::update`
//! comes from holding the map's write lock across the mutation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;

use nano_core::{
    AuditEvent, ContactUpdate, CustomerRecord, SessionRecord, SessionStatus, TransactionRecord,
    Turn,
};

use crate::{
    AuditStore, ConversationStore, CustomerStore, Result, SessionMutation, SessionStore,
    StoreError,
};

/// In-memory customer and transaction store
#[derive(Default)]
pub struct InMemoryCustomerStore {
    customers: RwLock<HashMap<String, CustomerRecord>>,
    transactions: RwLock<Vec<TransactionRecord>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: Vec<CustomerRecord>) -> Self {
        let store = Self::new();
        for customer in customers {
            store.insert_customer(customer);
        }
        store
    }

    pub fn insert_customer(&self, customer: CustomerRecord) {
        self.customers
            .write()
            .insert(customer.customer_id.clone(), customer);
    }

    pub fn insert_transaction(&self, transaction: TransactionRecord) {
        self.transactions.write().push(transaction);
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn find_customer(
        &self,
        name_fragment: &str,
        account_number: &str,
    ) -> Result<Option<CustomerRecord>> {
        let fragment = name_fragment.to_lowercase();
        let found = self
            .customers
            .read()
            .values()
            .find(|c| {
                c.account_number == account_number
                    && c.full_name.to_lowercase().contains(&fragment)
            })
            .cloned();
        Ok(found)
    }

    async fn get(&self, customer_id: &str) -> Result<Option<CustomerRecord>> {
        Ok(self.customers.read().get(customer_id).cloned())
    }

    async fn check_security_answer(&self, customer_id: &str, answer: &str) -> Result<bool> {
        let customers = self.customers.read();
        let customer = customers
            .get(customer_id)
            .ok_or_else(|| StoreError::NotFound(format!("customer {customer_id}")))?;
        Ok(customer.security_answer.trim().to_lowercase() == answer.trim().to_lowercase())
    }

    async fn increment_login_failure(&self, customer_id: &str) -> Result<u32> {
        let mut customers = self.customers.write();
        let customer = customers
            .get_mut(customer_id)
            .ok_or_else(|| StoreError::NotFound(format!("customer {customer_id}")))?;
        customer.login_attempts += 1;
        Ok(customer.login_attempts)
    }

    async fn reset_login_failure(&self, customer_id: &str) -> Result<()> {
        let mut customers = self.customers.write();
        let customer = customers
            .get_mut(customer_id)
            .ok_or_else(|| StoreError::NotFound(format!("customer {customer_id}")))?;
        customer.login_attempts = 0;
        customer.last_login = Some(Utc::now());
        Ok(())
    }

    async fn get_balance(&self, customer_id: &str) -> Result<f64> {
        let customers = self.customers.read();
        let customer = customers
            .get(customer_id)
            .ok_or_else(|| StoreError::NotFound(format!("customer {customer_id}")))?;
        Ok(customer.balance)
    }

    async fn list_transactions(
        &self,
        customer_id: &str,
        limit: usize,
        days: i64,
    ) -> Result<Vec<TransactionRecord>> {
        let cutoff = Utc::now() - Duration::days(days);
        let mut matching: Vec<TransactionRecord> = self
            .transactions
            .read()
            .iter()
            .filter(|t| t.customer_id == customer_id && t.created_at >= cutoff)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn update_contact_fields(
        &self,
        customer_id: &str,
        updates: &ContactUpdate,
    ) -> Result<Vec<String>> {
        let mut customers = self.customers.write();
        let customer = customers
            .get_mut(customer_id)
            .ok_or_else(|| StoreError::NotFound(format!("customer {customer_id}")))?;

        let mut updated = Vec::new();
        if let Some(ref email) = updates.email {
            customer.email = email.clone();
            updated.push("email".to_string());
        }
        if let Some(ref phone) = updates.phone {
            customer.phone = Some(phone.clone());
            updated.push("phone".to_string());
        }
        if let Some(ref address) = updates.address {
            customer.address = Some(address.clone());
            updated.push("address".to_string());
        }
        if !updated.is_empty() {
            customer.updated_at = Some(Utc::now());
        }
        Ok(updated)
    }
}

/// In-memory session store
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, customer_id: Option<String>) -> Result<SessionRecord> {
        let record = SessionRecord::new(customer_id);
        self.sessions
            .write()
            .insert(record.session_id.clone(), record.clone());
        tracing::debug!(session_id = %record.session_id, "Session created");
        Ok(record)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    async fn put(&self, record: SessionRecord) -> Result<()> {
        self.sessions
            .write()
            .insert(record.session_id.clone(), record);
        Ok(())
    }

    async fn update(&self, session_id: &str, mutation: SessionMutation) -> Result<SessionRecord> {
        let mut sessions = self.sessions.write();
        let record = sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))?;
        mutation(record);
        Ok(record.clone())
    }

    async fn terminate(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write();
        let record = sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))?;
        record.status = SessionStatus::Terminated;
        tracing::info!(session_id = %session_id, "Session terminated");
        Ok(())
    }

    async fn expire_idle(&self, timeout: Duration) -> Result<usize> {
        let mut sessions = self.sessions.write();
        let mut expired = 0;
        for record in sessions.values_mut() {
            if record.status == SessionStatus::Active && record.is_idle_beyond(timeout) {
                record.status = SessionStatus::Expired;
                expired += 1;
            }
        }
        if expired > 0 {
            tracing::info!(count = expired, "Expired idle sessions");
        }
        Ok(expired)
    }
}

/// In-memory audit trail
#[derive(Default)]
pub struct InMemoryAuditStore {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, event: AuditEvent) -> Result<()> {
        self.events.write().push(event);
        Ok(())
    }

    async fn events_for_session(&self, session_id: &str) -> Result<Vec<AuditEvent>> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect())
    }
}

/// In-memory conversation transcript
#[derive(Default)]
pub struct InMemoryConversationStore {
    turns: RwLock<HashMap<String, Vec<Turn>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append_turn(&self, session_id: &str, turn: Turn) -> Result<()> {
        self.turns
            .write()
            .entry(session_id.to_string())
            .or_default()
            .push(turn);
        Ok(())
    }

    async fn recent_turns(&self, session_id: &str, window: Duration) -> Result<Vec<Turn>> {
        let cutoff = Utc::now() - window;
        Ok(self
            .turns
            .read()
            .get(session_id)
            .map(|turns| {
                turns
                    .iter()
                    .filter(|t| t.timestamp >= cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nano_core::{AccountStatus, TransactionKind, TransactionStatus, VerificationState};

    fn test_customer() -> CustomerRecord {
        CustomerRecord {
            customer_id: "cust-1".to_string(),
            full_name: "John Doe".to_string(),
            account_number: "1234567890".to_string(),
            email: "john@test.com".to_string(),
            phone: None,
            address: None,
            security_question: "What is your pet's name?".to_string(),
            security_answer: "fluffy".to_string(),
            balance: 1000.0,
            status: AccountStatus::Active,
            login_attempts: 0,
            last_login: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_customer_by_name_fragment() {
        let store = InMemoryCustomerStore::with_customers(vec![test_customer()]);

        let found = store.find_customer("john doe", "1234567890").await.unwrap();
        assert!(found.is_some());

        // Partial name matches too
        let found = store.find_customer("Doe", "1234567890").await.unwrap();
        assert!(found.is_some());

        // Wrong account number misses
        let found = store.find_customer("John Doe", "9999999999").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_security_answer_case_insensitive() {
        let store = InMemoryCustomerStore::with_customers(vec![test_customer()]);

        assert!(store.check_security_answer("cust-1", "FLUFFY ").await.unwrap());
        assert!(!store.check_security_answer("cust-1", "rex").await.unwrap());
    }

    #[tokio::test]
    async fn test_login_failure_counter() {
        let store = InMemoryCustomerStore::with_customers(vec![test_customer()]);

        assert_eq!(store.increment_login_failure("cust-1").await.unwrap(), 1);
        assert_eq!(store.increment_login_failure("cust-1").await.unwrap(), 2);

        store.reset_login_failure("cust-1").await.unwrap();
        let customer = store.get("cust-1").await.unwrap().unwrap();
        assert_eq!(customer.login_attempts, 0);
        assert!(customer.last_login.is_some());
    }

    #[tokio::test]
    async fn test_update_contact_fields() {
        let store = InMemoryCustomerStore::with_customers(vec![test_customer()]);

        let updates = ContactUpdate {
            email: Some("new@test.com".to_string()),
            phone: Some("555-123-4567".to_string()),
            address: None,
        };
        let updated = store.update_contact_fields("cust-1", &updates).await.unwrap();
        assert_eq!(updated, vec!["email", "phone"]);

        let customer = store.get("cust-1").await.unwrap().unwrap();
        assert_eq!(customer.email, "new@test.com");
        assert_eq!(customer.phone.as_deref(), Some("555-123-4567"));
    }

    #[tokio::test]
    async fn test_transactions_newest_first_with_limit() {
        let store = InMemoryCustomerStore::with_customers(vec![test_customer()]);
        for i in 0..10 {
            store.insert_transaction(TransactionRecord {
                transaction_id: format!("txn-{i}"),
                customer_id: "cust-1".to_string(),
                amount: 10.0 * (i + 1) as f64,
                kind: TransactionKind::Debit,
                description: format!("purchase {i}"),
                balance_after: 1000.0 - 10.0 * (i + 1) as f64,
                created_at: Utc::now() - Duration::hours(i),
                status: TransactionStatus::Completed,
            });
        }

        let transactions = store.list_transactions("cust-1", 5, 30).await.unwrap();
        assert_eq!(transactions.len(), 5);
        assert_eq!(transactions[0].transaction_id, "txn-0");
        assert!(transactions
            .iter()
            .all(|t| t.status == TransactionStatus::Completed));

        // Old transactions fall outside the window
        store.insert_transaction(TransactionRecord {
            transaction_id: "txn-old".to_string(),
            customer_id: "cust-1".to_string(),
            amount: 1.0,
            kind: TransactionKind::Credit,
            description: "ancient".to_string(),
            balance_after: 1.0,
            created_at: Utc::now() - Duration::days(90),
            status: TransactionStatus::Completed,
        });
        let transactions = store.list_transactions("cust-1", 50, 30).await.unwrap();
        assert!(transactions.iter().all(|t| t.transaction_id != "txn-old"));
    }

    #[tokio::test]
    async fn test_session_atomic_update() {
        let store = InMemorySessionStore::new();
        let session = store.create(None).await.unwrap();

        let updated = store
            .update(
                &session.session_id,
                Box::new(|s| s.verification = VerificationState::AwaitingSecurityAnswer),
            )
            .await
            .unwrap();
        assert_eq!(
            updated.verification,
            VerificationState::AwaitingSecurityAnswer
        );

        let result = store.update("missing", Box::new(|_| {})).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_expire_idle_sweep() {
        let store = InMemorySessionStore::new();
        let stale = store.create(None).await.unwrap();
        let fresh = store.create(None).await.unwrap();

        store
            .update(
                &stale.session_id,
                Box::new(|s| s.last_activity = Utc::now() - Duration::minutes(90)),
            )
            .await
            .unwrap();

        let expired = store.expire_idle(Duration::minutes(30)).await.unwrap();
        assert_eq!(expired, 1);

        let stale = store.get(&stale.session_id).await.unwrap().unwrap();
        assert_eq!(stale.status, SessionStatus::Expired);
        let fresh = store.get(&fresh.session_id).await.unwrap().unwrap();
        assert_eq!(fresh.status, SessionStatus::Active);
    }

    #[tokio::test]
    async fn test_conversation_log() {
        let store = InMemoryConversationStore::new();
        store
            .append_turn("s1", Turn::user("Hello"))
            .await
            .unwrap();
        store
            .append_turn("s1", Turn::assistant("Hi there"))
            .await
            .unwrap();

        let turns = store.recent_turns("s1", Duration::hours(8)).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "Hello");

        let turns = store.recent_turns("other", Duration::hours(8)).await.unwrap();
        assert!(turns.is_empty());
    }
}
