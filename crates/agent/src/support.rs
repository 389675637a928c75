//! Support tooling: knowledge base, escalation, session summaries
//!
//! The knowledge base is a static table keyword-matched against the query.
//! Topic words are the match keys, so "balance" finds "Account Balance
//! Inquiry" without any scoring.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use nano_core::{AuditEvent, AuditOutcome, Result};
use nano_store::AuditStore;

/// One knowledge base topic
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeEntry {
    pub category: &'static str,
    pub topic: &'static str,
    pub information: &'static str,
    pub steps: &'static [&'static str],
    pub requirements: &'static [&'static str],
}

static KNOWLEDGE_BASE: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        category: "account_services",
        topic: "Account Balance Inquiry",
        information: "Check your current account balance and recent transactions.",
        steps: &["Verify identity", "Access account information", "Display balance"],
        requirements: &["Valid ID", "Security verification"],
    },
    KnowledgeEntry {
        category: "account_services",
        topic: "Account Statements",
        information: "View and download monthly account statements.",
        steps: &[
            "Log in to account",
            "Navigate to statements",
            "Select date range",
            "Download PDF",
        ],
        requirements: &["Account access", "Identity verification"],
    },
    KnowledgeEntry {
        category: "account_services",
        topic: "Update Contact Information",
        information: "Change your address, phone number, or email address.",
        steps: &["Verify identity", "Provide new information", "Confirm changes"],
        requirements: &["Identity verification", "Valid contact details"],
    },
    KnowledgeEntry {
        category: "transactions",
        topic: "Transfer Funds",
        information: "Transfer money between your accounts or to external accounts.",
        steps: &[
            "Verify identity",
            "Select accounts",
            "Enter amount",
            "Confirm transfer",
        ],
        requirements: &["Sufficient funds", "Valid recipient account"],
    },
    KnowledgeEntry {
        category: "transactions",
        topic: "Transaction History",
        information: "View your recent transaction history and details.",
        steps: &["Access account", "Select date range", "View transactions"],
        requirements: &["Account access"],
    },
    KnowledgeEntry {
        category: "transactions",
        topic: "Stop Payment",
        information: "Stop payment on a check or recurring transaction.",
        steps: &[
            "Provide check/transaction details",
            "Pay stop payment fee",
            "Confirm request",
        ],
        requirements: &["Valid reason", "Transaction details", "Fee payment"],
    },
    KnowledgeEntry {
        category: "security",
        topic: "Password Reset",
        information: "Reset your online banking password securely.",
        steps: &["Verify identity", "Set new password", "Confirm changes"],
        requirements: &["Identity verification", "Strong password"],
    },
    KnowledgeEntry {
        category: "security",
        topic: "Account Security",
        information: "Information about keeping your account secure.",
        steps: &[
            "Use strong passwords",
            "Monitor statements",
            "Report suspicious activity",
        ],
        requirements: &["Regular monitoring", "Secure practices"],
    },
    KnowledgeEntry {
        category: "security",
        topic: "Fraud Reporting",
        information: "Report suspected fraudulent activity on your account.",
        steps: &[
            "Contact bank immediately",
            "Provide transaction details",
            "Complete fraud affidavit",
        ],
        requirements: &["Immediate action", "Documentation"],
    },
    KnowledgeEntry {
        category: "general",
        topic: "Branch Locations",
        information: "Find Bank Of AI branches and ATM locations near you.",
        steps: &["Use branch locator", "Check hours", "Plan visit"],
        requirements: &["Location information"],
    },
    KnowledgeEntry {
        category: "general",
        topic: "Contact Information",
        information: "Get contact information for different banking services.",
        steps: &["Select service type", "Choose contact method"],
        requirements: &["Service identification"],
    },
    KnowledgeEntry {
        category: "general",
        topic: "Banking Hours",
        information: "Bank operating hours and holiday schedule.",
        steps: &["Check regular hours", "Verify holiday schedule"],
        requirements: &["None"],
    },
];

const BALANCE_FALLBACK: KnowledgeEntry = KnowledgeEntry {
    category: "account_services",
    topic: "Account Balance Inquiry",
    information: "I can help you check your account balance after verifying your identity.",
    steps: &[
        "Provide full name and account number",
        "Answer security question",
        "View current balance",
    ],
    requirements: &["Valid identification", "Security verification"],
};

/// Escalation queue priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EscalationPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl EscalationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationPriority::Low => "low",
            EscalationPriority::Normal => "normal",
            EscalationPriority::High => "high",
            EscalationPriority::Urgent => "urgent",
        }
    }

    fn wait_time(&self) -> &'static str {
        match self {
            EscalationPriority::Urgent => "immediate",
            EscalationPriority::High => "5-10 minutes",
            EscalationPriority::Low | EscalationPriority::Normal => "15-20 minutes",
        }
    }

    fn contact_method(&self) -> &'static str {
        match self {
            EscalationPriority::Urgent => "Direct transfer to senior representative",
            EscalationPriority::High => "Priority queue",
            EscalationPriority::Low | EscalationPriority::Normal => "Standard queue",
        }
    }
}

/// A created escalation ticket
#[derive(Debug, Clone, Serialize)]
pub struct EscalationTicket {
    pub escalation_id: String,
    pub priority: EscalationPriority,
    pub estimated_wait_time: &'static str,
    pub contact_method: &'static str,
    pub message: String,
}

/// One summarized audit action
#[derive(Debug, Clone, Serialize)]
pub struct SummarizedAction {
    pub timestamp: String,
    pub action: String,
    pub status: &'static str,
    pub details: String,
}

/// Session summary derived from the audit trail
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub customer_id: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: f64,
    pub verification_status: &'static str,
    pub tools_used: Vec<String>,
    pub total_actions: usize,
    pub successful_actions: usize,
    pub actions_taken: Vec<SummarizedAction>,
}

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Knowledge base, escalation and summary operations, sharing the audit
/// trail with the rest of the agent.
pub struct SupportTools {
    audit: Arc<dyn AuditStore>,
}

impl SupportTools {
    pub fn new(audit: Arc<dyn AuditStore>) -> Self {
        Self { audit }
    }

    /// Look up knowledge base topics whose title words appear in the query.
    /// Falls back to a canned balance entry when the query mentions balances
    /// or accounts but nothing matched.
    pub async fn knowledge_lookup(
        &self,
        session_id: &str,
        customer_id: Option<&str>,
        query: &str,
    ) -> Result<Vec<KnowledgeEntry>> {
        let query_lower = query.to_lowercase();
        let mut results: Vec<KnowledgeEntry> = KNOWLEDGE_BASE
            .iter()
            .filter(|entry| {
                entry
                    .topic
                    .to_lowercase()
                    .split_whitespace()
                    .any(|word| query_lower.contains(word))
            })
            .cloned()
            .collect();

        if results.is_empty()
            && (query_lower.contains("balance") || query_lower.contains("account"))
        {
            results.push(BALANCE_FALLBACK);
        }

        self.audit
            .append(AuditEvent::success(
                session_id,
                customer_id.map(String::from),
                "banking_knowledge_base",
                format!("Query: {query}, Results: {}", results.len()),
            ))
            .await?;

        Ok(results)
    }

    /// Open an escalation ticket for hand-off to a human representative.
    pub async fn escalate(
        &self,
        session_id: &str,
        customer_id: Option<&str>,
        reason: &str,
        priority: EscalationPriority,
    ) -> Result<EscalationTicket> {
        let suffix: String = session_id
            .chars()
            .rev()
            .take(6)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let escalation_id = format!("ESC-{}-{}", Utc::now().format("%Y%m%d"), suffix);
        let wait_time = priority.wait_time();

        info!(session_id, %escalation_id, reason, "Escalating to human representative");

        self.audit
            .append(AuditEvent::success(
                session_id,
                customer_id.map(String::from),
                "escalate_to_human",
                format!(
                    "Escalation {escalation_id}: {reason} (Priority: {})",
                    priority.as_str()
                ),
            ))
            .await?;

        Ok(EscalationTicket {
            message: format!(
                "I've created escalation ticket {escalation_id} to connect you with a human \
                 representative. Expected wait time: {wait_time}."
            ),
            escalation_id,
            priority,
            estimated_wait_time: wait_time,
            contact_method: priority.contact_method(),
        })
    }

    /// Summarize a session from its audit trail. Returns `None` when the
    /// session left no events behind.
    pub async fn session_summary(
        &self,
        session_id: &str,
        customer_id: Option<&str>,
    ) -> Result<Option<SessionSummary>> {
        let events = self.audit.events_for_session(session_id).await?;
        if events.is_empty() {
            return Ok(None);
        }

        let mut verification_status = "not_attempted";
        let mut tools_used = BTreeSet::new();
        let mut actions_taken = Vec::with_capacity(events.len());
        let mut successful_actions = 0;

        for event in &events {
            if event.action == "identity_verification" {
                verification_status = if event.outcome == AuditOutcome::Success {
                    "completed"
                } else {
                    "failed"
                };
            }
            if event.outcome == AuditOutcome::Success {
                successful_actions += 1;
            }
            tools_used.insert(event.action.clone());
            actions_taken.push(SummarizedAction {
                timestamp: event.timestamp.format(TIME_FORMAT).to_string(),
                action: event.action.clone(),
                status: event.outcome.as_str(),
                details: event.details.clone(),
            });
        }

        let first = &events[0];
        let last = &events[events.len() - 1];
        let duration_minutes =
            (last.timestamp - first.timestamp).num_seconds() as f64 / 60.0;

        Ok(Some(SessionSummary {
            session_id: session_id.to_string(),
            customer_id: customer_id.map(String::from),
            start_time: first.timestamp.format(TIME_FORMAT).to_string(),
            end_time: last.timestamp.format(TIME_FORMAT).to_string(),
            duration_minutes: (duration_minutes * 100.0).round() / 100.0,
            verification_status,
            tools_used: tools_used.into_iter().collect(),
            total_actions: actions_taken.len(),
            successful_actions,
            actions_taken,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nano_store::InMemoryAuditStore;

    fn tools() -> (SupportTools, Arc<InMemoryAuditStore>) {
        let audit = Arc::new(InMemoryAuditStore::new());
        (SupportTools::new(audit.clone()), audit)
    }

    #[tokio::test]
    async fn test_knowledge_lookup_by_topic_word() {
        let (tools, _) = tools();
        let results = tools
            .knowledge_lookup("s1", None, "how do I reset my password")
            .await
            .unwrap();
        assert!(results.iter().any(|e| e.topic == "Password Reset"));
    }

    #[tokio::test]
    async fn test_knowledge_balance_fallback() {
        let (tools, _) = tools();
        // "balance" is a topic word too, so pick a phrasing that misses all
        // topics but mentions an account
        let results = tools
            .knowledge_lookup("s1", None, "something about my account please")
            .await
            .unwrap();
        assert!(!results.is_empty());
    }

    #[tokio::test]
    async fn test_escalation_ticket_format() {
        let (tools, audit) = tools();
        let ticket = tools
            .escalate("abcdef123456", None, "customer request", EscalationPriority::Normal)
            .await
            .unwrap();

        assert!(ticket.escalation_id.starts_with("ESC-"));
        assert!(ticket.escalation_id.ends_with("123456"));
        assert_eq!(ticket.estimated_wait_time, "15-20 minutes");
        assert!(ticket.message.contains(&ticket.escalation_id));

        let events = audit.events_for_session("abcdef123456").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "escalate_to_human");
    }

    #[tokio::test]
    async fn test_urgent_priority_mapping() {
        let (tools, _) = tools();
        let ticket = tools
            .escalate("abcdef123456", None, "fraud", EscalationPriority::Urgent)
            .await
            .unwrap();
        assert_eq!(ticket.estimated_wait_time, "immediate");
        assert_eq!(
            ticket.contact_method,
            "Direct transfer to senior representative"
        );
    }

    #[tokio::test]
    async fn test_session_summary() {
        let (tools, audit) = tools();
        audit
            .append(AuditEvent::failed(
                "s1",
                None,
                "identity_verification",
                "Incorrect security answer",
            ))
            .await
            .unwrap();
        audit
            .append(AuditEvent::success(
                "s1",
                Some("cust-1".to_string()),
                "identity_verification",
                "Successful verification",
            ))
            .await
            .unwrap();
        audit
            .append(AuditEvent::success(
                "s1",
                Some("cust-1".to_string()),
                "query_account_balance",
                "Balance disclosed",
            ))
            .await
            .unwrap();

        let summary = tools
            .session_summary("s1", Some("cust-1"))
            .await
            .unwrap()
            .expect("summary");

        assert_eq!(summary.verification_status, "completed");
        assert_eq!(summary.total_actions, 3);
        assert_eq!(summary.successful_actions, 2);
        assert!(summary
            .tools_used
            .contains(&"query_account_balance".to_string()));
    }

    #[tokio::test]
    async fn test_summary_none_for_empty_session() {
        let (tools, _) = tools();
        let summary = tools.session_summary("missing", None).await.unwrap();
        assert!(summary.is_none());
    }
}
