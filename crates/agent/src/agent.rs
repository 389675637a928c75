//! The banking agent
//!
//! Orchestrates one message end to end: session validation, entity
//! extraction, classification, routing, execution against the stores, and
//! transcript/audit persistence. Store failures never reach the caller as
//! errors; they are logged and recovered into a generic apology so the
//! conversation can continue.

use std::sync::Arc;

use tracing::{debug, error, info};

use nano_config::BankingConfig;
use nano_core::{
    AuditEvent, AwaitingInput, ContactUpdate, IntentKind, Result, SessionRecord, Turn,
    TurnMetadata,
};
use nano_store::{AuditStore, ConversationStore, CustomerStore, SessionStore};

use crate::dialogue::{self, messages, AgentResponse, Route};
use crate::entity::{self, ExtractedEntities, UpdateField};
use crate::intent;
use crate::support::{EscalationPriority, SupportTools};
use crate::verification::{VerificationMachine, VerificationStep};

/// Conversational banking assistant core.
pub struct BankingAgent {
    sessions: Arc<dyn SessionStore>,
    customers: Arc<dyn CustomerStore>,
    audit: Arc<dyn AuditStore>,
    conversations: Arc<dyn ConversationStore>,
    verification: VerificationMachine,
    support: SupportTools,
    config: BankingConfig,
}

impl BankingAgent {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        customers: Arc<dyn CustomerStore>,
        audit: Arc<dyn AuditStore>,
        conversations: Arc<dyn ConversationStore>,
        config: BankingConfig,
    ) -> Self {
        let verification = VerificationMachine::new(
            customers.clone(),
            audit.clone(),
            config.max_verification_attempts,
        );
        let support = SupportTools::new(audit.clone());
        Self {
            sessions,
            customers,
            audit,
            conversations,
            verification,
            support,
            config,
        }
    }

    pub fn support(&self) -> &SupportTools {
        &self.support
    }

    /// Process one customer message. Never fails: internal faults come back
    /// as an apology response with the `error` flag set.
    pub async fn process_message(&self, session_id: &str, message: &str) -> AgentResponse {
        match self.try_process(session_id, message).await {
            Ok(response) => response,
            Err(err) => {
                error!(session_id, %err, "Message processing failed");
                let _ = self
                    .audit
                    .append(AuditEvent::failed(
                        session_id,
                        None,
                        "process_message",
                        format!("Error: {err}"),
                    ))
                    .await;
                let mut response =
                    AgentResponse::text(session_id, messages::TECHNICAL_DIFFICULTIES);
                response.error = Some(true);
                response
            }
        }
    }

    async fn try_process(&self, session_id: &str, message: &str) -> Result<AgentResponse> {
        let Some(mut session) = self.sessions.get(session_id).await? else {
            return Ok(
                AgentResponse::text(session_id, messages::SESSION_UNKNOWN).requires_new_session()
            );
        };

        if !session.is_active() {
            return Ok(
                AgentResponse::text(session_id, messages::SESSION_UNKNOWN).requires_new_session()
            );
        }

        let timeout = chrono::Duration::minutes(self.config.session_timeout_minutes);
        if session.is_idle_beyond(timeout) {
            self.sessions
                .update(
                    session_id,
                    Box::new(|s| s.status = nano_core::SessionStatus::Expired),
                )
                .await?;
            return Ok(
                AgentResponse::text(session_id, messages::SESSION_EXPIRED).requires_new_session()
            );
        }

        session.touch();

        self.conversations
            .append_turn(session_id, Turn::user(message))
            .await?;

        let entities = entity::extract(message);
        let classification = intent::classify(message);
        debug!(
            session_id,
            intent = %classification.intent,
            confidence = classification.confidence,
            "Message classified"
        );

        let route = dialogue::route(&session, &classification, &entities, message);
        let response = self
            .execute(route, &mut session, message, &entities)
            .await?;

        self.sessions.put(session.clone()).await?;

        let metadata = TurnMetadata {
            intent: Some(classification.intent),
            tools_used: response.tools_used.clone(),
            requires_verification: response.requires_verification.unwrap_or(false),
            verified: response.verified.unwrap_or(false),
        };
        self.conversations
            .append_turn(
                session_id,
                Turn::assistant(&response.response).with_metadata(metadata),
            )
            .await?;

        self.audit
            .append(AuditEvent::success(
                session_id,
                session.customer_id.clone(),
                "process_message",
                format!(
                    "Intent: {}, Response length: {}",
                    classification.intent,
                    response.response.len()
                ),
            ))
            .await?;

        Ok(response)
    }

    async fn execute(
        &self,
        route: Route,
        session: &mut SessionRecord,
        message: &str,
        entities: &ExtractedEntities,
    ) -> Result<AgentResponse> {
        let session_id = session.session_id.clone();
        match route {
            Route::Greeting => Ok(AgentResponse::text(
                &session_id,
                format!(
                    "Hello! I'm {}, your {} customer service assistant. How can I help you today?",
                    self.config.assistant_name, self.config.bank_name
                ),
            )),

            Route::Escalation => {
                let ticket = self
                    .support
                    .escalate(
                        &session_id,
                        session.customer_id.as_deref(),
                        "Customer requested human representative",
                        EscalationPriority::Normal,
                    )
                    .await?;
                let mut response = AgentResponse::text(&session_id, ticket.message)
                    .with_tool("escalate_to_human");
                response.escalation_id = Some(ticket.escalation_id);
                Ok(response)
            }

            Route::VerificationRequired(wanted) => {
                session.next_intent = Some(wanted);
                session.awaiting = Some(AwaitingInput::Credentials);
                Ok(
                    AgentResponse::text(&session_id, messages::VERIFICATION_REQUEST)
                        .requires_verification(),
                )
            }

            Route::Credentials => self.handle_credentials(session, entities).await,

            Route::SecurityAnswer => self.handle_security_answer(session, message).await,

            Route::VerifiedOperation(op) => self.handle_verified(session, op, message, entities).await,

            Route::Support => {
                let results = self
                    .support
                    .knowledge_lookup(&session_id, session.customer_id.as_deref(), message)
                    .await?;
                let text = match results.first() {
                    Some(entry) => {
                        let mut text = format!(
                            "Here's information about {}:\n\n{}",
                            entry.topic, entry.information
                        );
                        if !entry.steps.is_empty() {
                            text.push_str("\n\nSteps:\n");
                            text.push_str(
                                &entry
                                    .steps
                                    .iter()
                                    .map(|s| format!("\u{2022} {s}"))
                                    .collect::<Vec<_>>()
                                    .join("\n"),
                            );
                        }
                        text
                    }
                    None => messages::SUPPORT_DETAILS_PROMPT.to_string(),
                };
                Ok(AgentResponse::text(&session_id, text).with_tool("banking_knowledge_base"))
            }

            Route::Clarify => Ok(AgentResponse::text(&session_id, messages::CLARIFY)),
        }
    }

    async fn handle_credentials(
        &self,
        session: &mut SessionRecord,
        entities: &ExtractedEntities,
    ) -> Result<AgentResponse> {
        let session_id = session.session_id.clone();
        let (Some(full_name), Some(account_number)) =
            (entities.full_name.as_deref(), entities.account_number.as_deref())
        else {
            session.awaiting = Some(AwaitingInput::Credentials);
            return Ok(
                AgentResponse::text(&session_id, messages::CREDENTIALS_PROMPT)
                    .requires_verification(),
            );
        };

        let step = self
            .verification
            .submit_credentials(session, full_name, account_number)
            .await?;

        let response = match step {
            VerificationStep::SecurityQuestion { question } => {
                AgentResponse::text(
                    &session_id,
                    format!("Please answer your security question: {question}"),
                )
                .requires_security_question()
            }
            VerificationStep::NotFound => {
                AgentResponse::text(&session_id, messages::CUSTOMER_NOT_FOUND)
            }
            VerificationStep::AccountInactive => {
                AgentResponse::text(&session_id, messages::ACCOUNT_INACTIVE)
            }
            VerificationStep::LockedOut => AgentResponse::text(&session_id, messages::LOCKED_OUT),
            // submit_credentials never yields the answer-phase outcomes
            _ => AgentResponse::text(&session_id, messages::CREDENTIALS_PROMPT)
                .requires_verification(),
        };
        Ok(response.with_tool("verify_customer_identity"))
    }

    async fn handle_security_answer(
        &self,
        session: &mut SessionRecord,
        answer: &str,
    ) -> Result<AgentResponse> {
        let session_id = session.session_id.clone();
        let step = self.verification.submit_answer(session, answer).await?;

        let response = match step {
            VerificationStep::Verified {
                customer_id,
                customer_name,
            } => {
                session.next_intent = None;
                info!(session_id = %session_id, customer_id = %customer_id, "Session verified");
                AgentResponse::text(
                    &session_id,
                    format!(
                        "Identity verified successfully. Welcome, {customer_name}! What can I \
                         help you with today?"
                    ),
                )
                .verified(customer_id)
            }
            VerificationStep::WrongAnswer { remaining } => AgentResponse::text(
                &session_id,
                format!(
                    "Incorrect security answer. Please try again. You have {remaining} \
                     {} remaining.",
                    if remaining == 1 { "attempt" } else { "attempts" }
                ),
            )
            .requires_security_question(),
            VerificationStep::Exhausted => AgentResponse::text(&session_id, messages::LOCKED_OUT),
            _ => AgentResponse::text(&session_id, messages::CREDENTIALS_PROMPT)
                .requires_verification(),
        };
        Ok(response.with_tool("verify_customer_identity"))
    }

    async fn handle_verified(
        &self,
        session: &mut SessionRecord,
        intent: IntentKind,
        message: &str,
        entities: &ExtractedEntities,
    ) -> Result<AgentResponse> {
        let session_id = session.session_id.clone();
        // Routing guarantees a bound customer here.
        let Some(customer_id) = session.customer_id.clone() else {
            return Ok(
                AgentResponse::text(&session_id, messages::CREDENTIALS_PROMPT)
                    .requires_verification(),
            );
        };

        match intent {
            IntentKind::BalanceInquiry => {
                let balance = self.customers.get_balance(&customer_id).await?;
                self.audit
                    .append(AuditEvent::success(
                        &session_id,
                        Some(customer_id.clone()),
                        "query_account_balance",
                        "Balance disclosed",
                    ))
                    .await?;
                let mut response = AgentResponse::text(
                    &session_id,
                    format!(
                        "Your current account balance is ${balance:.2}. Is there anything else I \
                         can help you with?"
                    ),
                )
                .with_tool("query_account_balance");
                response.customer_id = Some(customer_id);
                Ok(response)
            }

            IntentKind::TransactionHistory => {
                let transactions = self
                    .customers
                    .list_transactions(
                        &customer_id,
                        self.config.transaction_history_limit,
                        self.config.transaction_history_days,
                    )
                    .await?;
                self.audit
                    .append(AuditEvent::success(
                        &session_id,
                        Some(customer_id.clone()),
                        "transaction_history",
                        format!("Returned {} transactions", transactions.len()),
                    ))
                    .await?;

                let text = if transactions.is_empty() {
                    messages::NO_RECENT_TRANSACTIONS.to_string()
                } else {
                    let mut text = String::from("Here are your recent transactions:\n\n");
                    for txn in transactions.iter().take(3) {
                        text.push_str(&format!(
                            "\u{2022} {}: {} ${:.2} - {}\n",
                            txn.created_at.format("%Y-%m-%d"),
                            capitalize(txn.kind.as_str()),
                            txn.amount,
                            txn.description
                        ));
                    }
                    text.push_str(&format!(
                        "\nTotal transactions in last {} days: {}",
                        self.config.transaction_history_days,
                        transactions.len()
                    ));
                    text
                };

                let mut response =
                    AgentResponse::text(&session_id, text).with_tool("transaction_history");
                response.customer_id = Some(customer_id);
                Ok(response)
            }

            IntentKind::UpdateInformation => {
                self.handle_contact_update(session, &customer_id, entities)
                    .await
            }

            IntentKind::FileManagement => {
                let mut response = AgentResponse::text(&session_id, messages::FILE_MANAGEMENT);
                response.customer_id = Some(customer_id);
                Ok(response)
            }

            IntentKind::DocumentOcr => {
                let mut response = AgentResponse::text(&session_id, messages::DOCUMENT_OCR);
                response.customer_id = Some(customer_id);
                Ok(response)
            }

            _ => {
                let results = self
                    .support
                    .knowledge_lookup(&session_id, Some(customer_id.as_str()), message)
                    .await?;
                let text = match results.first() {
                    Some(entry) => format!(
                        "Here's information about {}:\n\n{}",
                        entry.topic, entry.information
                    ),
                    None => messages::VERIFIED_FALLBACK.to_string(),
                };
                let mut response =
                    AgentResponse::text(&session_id, text).with_tool("banking_knowledge_base");
                response.customer_id = Some(customer_id);
                Ok(response)
            }
        }
    }

    async fn handle_contact_update(
        &self,
        session: &SessionRecord,
        customer_id: &str,
        entities: &ExtractedEntities,
    ) -> Result<AgentResponse> {
        let session_id = session.session_id.clone();

        let update = match entities.update_field {
            Some(UpdateField::Email) => entities.new_email.as_ref().map(|email| {
                (
                    "email",
                    email.clone(),
                    ContactUpdate {
                        email: Some(email.clone()),
                        ..Default::default()
                    },
                )
            }),
            Some(UpdateField::Phone) => entities.new_phone.as_ref().map(|phone| {
                (
                    "phone",
                    phone.clone(),
                    ContactUpdate {
                        phone: Some(phone.clone()),
                        ..Default::default()
                    },
                )
            }),
            // Addresses are free-form; we always ask rather than guess one
            // out of the message.
            _ => None,
        };

        let Some((field, value, update)) = update else {
            let mut response = AgentResponse::text(&session_id, messages::UPDATE_PROMPT);
            response.customer_id = Some(customer_id.to_string());
            return Ok(response);
        };

        let updated = self
            .customers
            .update_contact_fields(customer_id, &update)
            .await?;
        self.audit
            .append(AuditEvent::success(
                &session_id,
                Some(customer_id.to_string()),
                "update_customer_record",
                format!("Updated fields: {}", updated.join(", ")),
            ))
            .await?;

        let mut response = AgentResponse::text(
            &session_id,
            format!(
                "I've successfully updated your {field} to {value}. Is there anything else I can \
                 help you with?"
            ),
        )
        .with_tool("update_customer_record");
        response.customer_id = Some(customer_id.to_string());
        Ok(response)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
