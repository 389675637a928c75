//! Two-factor identity verification
//!
//! Drives a session through `Unverified -> AwaitingSecurityAnswer -> Verified`
//! against the customer store. Factor one is full name plus account number,
//! factor two is the security question. Three wrong answers in an episode
//! drop the session back to `Unverified` with the pending attempt cleared.
//!
//! The machine mutates the session record it is handed; callers persist it.
//! Every transition appends an audit event.

use std::sync::Arc;

use tracing::{info, warn};

use nano_core::{AuditEvent, Result, SessionRecord, VerificationAttempt, VerificationState};
use nano_store::{AuditStore, CustomerStore};

const AUDIT_ACTION: &str = "identity_verification";

/// Outcome of one verification step
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationStep {
    /// No customer matched the name/account pair
    NotFound,
    /// Matched, but the account is suspended or closed
    AccountInactive,
    /// The store-side failure counter already hit the cap
    LockedOut,
    /// First factor passed; the security question must be answered next
    SecurityQuestion { question: String },
    /// Second factor passed
    Verified { customer_id: String, customer_name: String },
    /// Wrong answer with budget left
    WrongAnswer { remaining: u8 },
    /// Wrong answer exhausted the budget; session is back to unverified
    Exhausted,
    /// An answer arrived with no challenge in flight
    NoPendingChallenge,
}

/// The verification state machine.
pub struct VerificationMachine {
    customers: Arc<dyn CustomerStore>,
    audit: Arc<dyn AuditStore>,
    max_attempts: u8,
}

impl VerificationMachine {
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        audit: Arc<dyn AuditStore>,
        max_attempts: u8,
    ) -> Self {
        Self {
            customers,
            audit,
            max_attempts,
        }
    }

    /// First factor: match a name/account pair and open a security challenge.
    pub async fn submit_credentials(
        &self,
        session: &mut SessionRecord,
        full_name: &str,
        account_number: &str,
    ) -> Result<VerificationStep> {
        let customer = match self
            .customers
            .find_customer(full_name, account_number)
            .await?
        {
            Some(customer) => customer,
            None => {
                warn!(session_id = %session.session_id, "verification: customer not found");
                self.log(
                    session,
                    None,
                    "Failed verification - customer not found",
                    false,
                )
                .await?;
                return Ok(VerificationStep::NotFound);
            }
        };

        if !customer.is_active() {
            self.log(
                session,
                Some(customer.customer_id.as_str()),
                &format!("Account status: {}", customer.status),
                false,
            )
            .await?;
            return Ok(VerificationStep::AccountInactive);
        }

        if customer.login_attempts >= u32::from(self.max_attempts) {
            self.log(
                session,
                Some(customer.customer_id.as_str()),
                "Too many failed attempts",
                false,
            )
            .await?;
            return Ok(VerificationStep::LockedOut);
        }

        session.verification = VerificationState::AwaitingSecurityAnswer;
        session.pending = Some(VerificationAttempt::new(
            full_name,
            account_number,
            &customer.customer_id,
        ));
        session.awaiting = None;

        info!(
            session_id = %session.session_id,
            customer_id = %customer.customer_id,
            "verification: first factor passed, security question issued"
        );

        Ok(VerificationStep::SecurityQuestion {
            question: customer.security_question,
        })
    }

    /// Second factor: check the security answer for the pending attempt.
    pub async fn submit_answer(
        &self,
        session: &mut SessionRecord,
        answer: &str,
    ) -> Result<VerificationStep> {
        let Some(pending) = session.pending.clone() else {
            return Ok(VerificationStep::NoPendingChallenge);
        };

        if self
            .customers
            .check_security_answer(&pending.customer_id, answer)
            .await?
        {
            self.customers
                .reset_login_failure(&pending.customer_id)
                .await?;

            let customer_name = match self.customers.get(&pending.customer_id).await? {
                Some(customer) => customer.full_name,
                None => pending.full_name.clone(),
            };

            session.mark_verified(&pending.customer_id);
            self.log(
                session,
                Some(pending.customer_id.as_str()),
                "Successful verification",
                true,
            )
            .await?;

            info!(
                session_id = %session.session_id,
                customer_id = %pending.customer_id,
                "verification: identity verified"
            );

            return Ok(VerificationStep::Verified {
                customer_id: pending.customer_id,
                customer_name,
            });
        }

        self.customers
            .increment_login_failure(&pending.customer_id)
            .await?;

        let attempts = pending.attempts + 1;
        if attempts >= self.max_attempts {
            session.reset_verification();
            self.log(
                session,
                Some(pending.customer_id.as_str()),
                "Too many failed attempts",
                false,
            )
            .await?;
            warn!(
                session_id = %session.session_id,
                customer_id = %pending.customer_id,
                "verification: attempt budget exhausted"
            );
            return Ok(VerificationStep::Exhausted);
        }

        let remaining = self.max_attempts - attempts;
        if let Some(pending) = session.pending.as_mut() {
            pending.attempts = attempts;
        }
        self.log(
            session,
            Some(pending.customer_id.as_str()),
            "Incorrect security answer",
            false,
        )
        .await?;

        Ok(VerificationStep::WrongAnswer { remaining })
    }

    async fn log(
        &self,
        session: &SessionRecord,
        customer_id: Option<&str>,
        details: &str,
        success: bool,
    ) -> Result<()> {
        let customer_id = customer_id.map(String::from);
        let event = if success {
            AuditEvent::success(&session.session_id, customer_id, AUDIT_ACTION, details)
        } else {
            AuditEvent::failed(&session.session_id, customer_id, AUDIT_ACTION, details)
        };
        self.audit.append(event).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nano_core::{AccountStatus, CustomerRecord};
    use nano_store::{AuditStore, CustomerStore, InMemoryAuditStore, InMemoryCustomerStore};

    fn john_doe() -> CustomerRecord {
        CustomerRecord {
            customer_id: "cust-1".to_string(),
            full_name: "John Doe".to_string(),
            account_number: "1234567890".to_string(),
            email: "john@example.com".to_string(),
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

    fn machine() -> (VerificationMachine, Arc<InMemoryAuditStore>) {
        let customers = Arc::new(InMemoryCustomerStore::with_customers(vec![john_doe()]));
        let audit = Arc::new(InMemoryAuditStore::new());
        (
            VerificationMachine::new(customers, audit.clone(), 3),
            audit,
        )
    }

    #[tokio::test]
    async fn test_correct_pair_opens_challenge_not_verified() {
        let (machine, _) = machine();
        let mut session = SessionRecord::new(None);

        let step = machine
            .submit_credentials(&mut session, "John Doe", "1234567890")
            .await
            .unwrap();

        assert!(matches!(step, VerificationStep::SecurityQuestion { .. }));
        assert_eq!(
            session.verification,
            VerificationState::AwaitingSecurityAnswer
        );
        assert!(!session.is_verified());
        assert!(session.pending.is_some());
    }

    #[tokio::test]
    async fn test_unknown_account_stays_unverified() {
        let (machine, audit) = machine();
        let mut session = SessionRecord::new(None);

        let step = machine
            .submit_credentials(&mut session, "John Doe", "9999999999")
            .await
            .unwrap();

        assert_eq!(step, VerificationStep::NotFound);
        assert_eq!(session.verification, VerificationState::Unverified);

        let events = audit
            .events_for_session(&session.session_id)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_correct_answer_verifies() {
        let (machine, _) = machine();
        let mut session = SessionRecord::new(None);
        machine
            .submit_credentials(&mut session, "John Doe", "1234567890")
            .await
            .unwrap();

        let step = machine
            .submit_answer(&mut session, "Fluffy ")
            .await
            .unwrap();

        match step {
            VerificationStep::Verified {
                customer_id,
                customer_name,
            } => {
                assert_eq!(customer_id, "cust-1");
                assert_eq!(customer_name, "John Doe");
            }
            other => panic!("expected Verified, got {other:?}"),
        }
        assert!(session.is_verified());
        assert!(session.pending.is_none());
    }

    #[tokio::test]
    async fn test_three_wrong_answers_reset_to_unverified() {
        let (machine, _) = machine();
        let mut session = SessionRecord::new(None);
        machine
            .submit_credentials(&mut session, "John Doe", "1234567890")
            .await
            .unwrap();

        let step = machine.submit_answer(&mut session, "rex").await.unwrap();
        assert_eq!(step, VerificationStep::WrongAnswer { remaining: 2 });

        let step = machine.submit_answer(&mut session, "rex").await.unwrap();
        assert_eq!(step, VerificationStep::WrongAnswer { remaining: 1 });

        let step = machine.submit_answer(&mut session, "rex").await.unwrap();
        assert_eq!(step, VerificationStep::Exhausted);
        assert_eq!(session.verification, VerificationState::Unverified);
        assert!(session.pending.is_none());
    }

    #[tokio::test]
    async fn test_locked_customer_refused_at_first_factor() {
        let customers = Arc::new(InMemoryCustomerStore::with_customers(vec![john_doe()]));
        for _ in 0..3 {
            customers.increment_login_failure("cust-1").await.unwrap();
        }
        let audit = Arc::new(InMemoryAuditStore::new());
        let machine = VerificationMachine::new(customers, audit, 3);
        let mut session = SessionRecord::new(None);

        let step = machine
            .submit_credentials(&mut session, "John Doe", "1234567890")
            .await
            .unwrap();

        assert_eq!(step, VerificationStep::LockedOut);
        assert_eq!(session.verification, VerificationState::Unverified);
    }

    #[tokio::test]
    async fn test_answer_without_challenge() {
        let (machine, _) = machine();
        let mut session = SessionRecord::new(None);

        let step = machine.submit_answer(&mut session, "fluffy").await.unwrap();
        assert_eq!(step, VerificationStep::NoPendingChallenge);
    }
}
