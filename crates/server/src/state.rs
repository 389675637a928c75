//! Shared application state

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use nano_agent::BankingAgent;
use nano_config::Settings;
use nano_core::{AccountStatus, CustomerRecord};
use nano_store::{
    AuditStore, ConversationStore, CustomerStore, InMemoryAuditStore, InMemoryConversationStore,
    InMemoryCustomerStore, InMemorySessionStore, SessionStore,
};

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub agent: Arc<BankingAgent>,
    pub sessions: Arc<dyn SessionStore>,
    /// Prometheus handle; `None` when metrics were not installed (tests)
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        sessions: Arc<dyn SessionStore>,
        customers: Arc<dyn CustomerStore>,
        audit: Arc<dyn AuditStore>,
        conversations: Arc<dyn ConversationStore>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let agent = Arc::new(BankingAgent::new(
            sessions.clone(),
            customers,
            audit,
            conversations,
            settings.banking.clone(),
        ));
        Self {
            settings: Arc::new(settings),
            agent,
            sessions,
            metrics,
        }
    }

    /// State wired to in-memory backends, for development and tests.
    pub fn in_memory(settings: Settings) -> Self {
        Self::new(
            settings,
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryCustomerStore::new()),
            Arc::new(InMemoryAuditStore::new()),
            Arc::new(InMemoryConversationStore::new()),
            None,
        )
    }
}

/// The demo customers the original deployment ships with.
pub fn demo_customers() -> Vec<CustomerRecord> {
    vec![
        CustomerRecord {
            customer_id: "cust-0001".to_string(),
            full_name: "John Doe".to_string(),
            account_number: "1234567890".to_string(),
            email: "john.doe@email.com".to_string(),
            phone: Some("555-0123".to_string()),
            address: Some("123 Main St, City, State 12345".to_string()),
            security_question: "What is your pet's name?".to_string(),
            security_answer: "fluffy".to_string(),
            balance: 2500.00,
            status: AccountStatus::Active,
            login_attempts: 0,
            last_login: None,
            updated_at: None,
        },
        CustomerRecord {
            customer_id: "cust-0002".to_string(),
            full_name: "Jane Smith".to_string(),
            account_number: "2345678901".to_string(),
            email: "jane.smith@email.com".to_string(),
            phone: Some("555-0124".to_string()),
            address: Some("456 Oak Ave, City, State 12345".to_string()),
            security_question: "What city were you born in?".to_string(),
            security_answer: "chicago".to_string(),
            balance: 1750.50,
            status: AccountStatus::Active,
            login_attempts: 0,
            last_login: None,
            updated_at: None,
        },
        CustomerRecord {
            customer_id: "cust-0003".to_string(),
            full_name: "Bob Johnson".to_string(),
            account_number: "3456789012".to_string(),
            email: "bob.johnson@email.com".to_string(),
            phone: Some("555-0125".to_string()),
            address: Some("789 Pine Rd, City, State 12345".to_string()),
            security_question: "What is your mother's maiden name?".to_string(),
            security_answer: "williams".to_string(),
            balance: 3200.75,
            status: AccountStatus::Active,
            login_attempts: 0,
            last_login: None,
            updated_at: None,
        },
    ]
}
