//! Keyword intent classifier
//!
//! Scores a message against per-category keyword tables and picks the
//! highest-scoring category. Matching is case-insensitive substring
//! containment, so "hi" matches inside "this" - a known limitation we accept
//! for predictability. Categories are data-driven rules; ties resolve by the
//! rule's declaration rank, lowest first.

use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use nano_core::IntentKind;

/// Greeting only fires on short messages.
const GREETING_MAX_WORDS: usize = 10;
const GREETING_CONFIDENCE: f64 = 0.8;
/// Confidence assigned to the fallback category.
const FALLBACK_CONFIDENCE: f64 = 0.1;

const IDENTITY_KEYWORDS: &[&str] = &[
    "verify", "identity", "login", "authenticate", "who am i", "my name",
];
const BALANCE_KEYWORDS: &[&str] = &[
    "balance", "how much", "account total", "money", "funds", "available", "checking", "savings",
];
const TRANSACTION_KEYWORDS: &[&str] = &[
    "history",
    "transactions",
    "recent",
    "statements",
    "spent",
    "charges",
    "deposits",
    "withdrawals",
    "activity",
];
/// Update verbs plus contact nouns; either half alone is enough to score.
const UPDATE_KEYWORDS: &[&str] = &[
    "update", "change", "modify", "new", "correct", "address", "phone", "email", "number",
    "contact",
];
const FILE_KEYWORDS: &[&str] = &[
    "upload",
    "document",
    "file",
    "statement",
    "download",
    "pdf",
    "attachment",
    "scan",
    "image",
    "photo",
];
const OCR_KEYWORDS: &[&str] = &["read", "extract", "text", "ocr", "analyze", "check", "receipt"];
const HELP_KEYWORDS: &[&str] = &["help", "how", "what", "explain", "support", "assist", "can you"];
const ESCALATION_KEYWORDS: &[&str] = &[
    "human",
    "representative",
    "manager",
    "escalate",
    "complain",
    "supervisor",
    "agent",
    "person",
    "speak to",
];
const GREETING_KEYWORDS: &[&str] = &[
    "hello",
    "hi",
    "good morning",
    "good afternoon",
    "good evening",
    "hey",
    "greetings",
];

/// One scoring rule: score = matched-keyword count x weight.
struct IntentRule {
    intent: IntentKind,
    keywords: &'static [&'static str],
    weight: f64,
    /// Tie-break rank; lower wins on equal score
    rank: usize,
}

/// Straightforwardly-scored categories. The document pair (file vs OCR) and
/// the greeting gate need extra conditions and are handled alongside, with
/// ranks slotting them into this order: identity 0, balance 1, transaction
/// 2, update 3, documents 4, support 5, escalation 6, greeting 7.
static RULES: &[IntentRule] = &[
    IntentRule {
        intent: IntentKind::IdentityVerification,
        keywords: IDENTITY_KEYWORDS,
        weight: 0.3,
        rank: 0,
    },
    IntentRule {
        intent: IntentKind::BalanceInquiry,
        keywords: BALANCE_KEYWORDS,
        weight: 0.4,
        rank: 1,
    },
    IntentRule {
        intent: IntentKind::TransactionHistory,
        keywords: TRANSACTION_KEYWORDS,
        weight: 0.35,
        rank: 2,
    },
    IntentRule {
        intent: IntentKind::UpdateInformation,
        keywords: UPDATE_KEYWORDS,
        weight: 0.3,
        rank: 3,
    },
    IntentRule {
        intent: IntentKind::GeneralSupport,
        keywords: HELP_KEYWORDS,
        weight: 0.2,
        rank: 5,
    },
    IntentRule {
        intent: IntentKind::Escalation,
        keywords: ESCALATION_KEYWORDS,
        weight: 0.5,
        rank: 6,
    },
];

const DOCUMENT_RANK: usize = 4;
const GREETING_RANK: usize = 7;

/// Outcome of classifying one message
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub intent: IntentKind,
    pub confidence: f64,
    /// All scored candidates, best first
    pub ranked: Vec<(IntentKind, f64)>,
}

/// Count how many table entries the lowered message contains.
fn keyword_hits(lower: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| lower.contains(*kw)).count()
}

/// Classify a customer message into an intent category.
///
/// Every category with at least one keyword hit becomes a candidate; the
/// top-scoring one wins. With no hits at all the result is
/// `GeneralInquiry` at a nominal confidence.
pub fn classify(message: &str) -> Classification {
    let lower = message.to_lowercase();
    let mut candidates: Vec<(usize, IntentKind, f64)> = Vec::new();

    for rule in RULES {
        let hits = keyword_hits(&lower, rule.keywords);
        if hits > 0 {
            candidates.push((rule.rank, rule.intent, hits as f64 * rule.weight));
        }
    }

    // A document message with any OCR verb becomes document_ocr; plain
    // document talk stays file_management.
    let file = keyword_hits(&lower, FILE_KEYWORDS);
    let ocr = keyword_hits(&lower, OCR_KEYWORDS);
    if ocr > 0 {
        candidates.push((DOCUMENT_RANK, IntentKind::DocumentOcr, (file + ocr) as f64 * 0.4));
    } else if file > 0 {
        candidates.push((DOCUMENT_RANK, IntentKind::FileManagement, file as f64 * 0.35));
    }

    let word_count = lower.unicode_words().count();
    if keyword_hits(&lower, GREETING_KEYWORDS) > 0 && word_count < GREETING_MAX_WORDS {
        candidates.push((GREETING_RANK, IntentKind::Greeting, GREETING_CONFIDENCE));
    }

    if candidates.is_empty() {
        return Classification {
            intent: IntentKind::GeneralInquiry,
            confidence: FALLBACK_CONFIDENCE,
            ranked: vec![(IntentKind::GeneralInquiry, FALLBACK_CONFIDENCE)],
        };
    }

    candidates.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let (_, intent, confidence) = candidates[0];
    Classification {
        intent,
        confidence,
        ranked: candidates
            .into_iter()
            .map(|(_, intent, score)| (intent, score))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_short_message() {
        let c = classify("Hello!");
        assert_eq!(c.intent, IntentKind::Greeting);
        assert!((c.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_greeting_suppressed_on_long_message() {
        let c = classify(
            "hello there I was wondering if someone could possibly tell me about the recent activity on my account",
        );
        assert_ne!(c.intent, IntentKind::Greeting);
    }

    #[test]
    fn test_balance_inquiry() {
        let c = classify("What is my balance?");
        assert_eq!(c.intent, IntentKind::BalanceInquiry);
    }

    #[test]
    fn test_transaction_history() {
        let c = classify("Show me my recent transactions");
        assert_eq!(c.intent, IntentKind::TransactionHistory);
        // two hits at 0.35 each
        assert!((c.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_escalation_beats_support() {
        let c = classify("I want to speak to a human representative");
        assert_eq!(c.intent, IntentKind::Escalation);
    }

    #[test]
    fn test_update_combines_contact_keywords() {
        let c = classify("I want to update my email");
        assert_eq!(c.intent, IntentKind::UpdateInformation);
        assert!((c.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_ocr_gates_on_ocr_keyword() {
        let c = classify("Can you read this receipt image?");
        assert_eq!(c.intent, IntentKind::DocumentOcr);

        let c = classify("I want to upload a pdf");
        assert_eq!(c.intent, IntentKind::FileManagement);
    }

    #[test]
    fn test_tie_resolves_by_rank() {
        // "my name" (identity, 0.3) ties "number" (update, 0.3); identity is
        // declared first and wins
        let c = classify("my name and account number");
        assert_eq!(c.intent, IntentKind::IdentityVerification);
    }

    #[test]
    fn test_fallback() {
        let c = classify("The weather is nice today");
        assert_eq!(c.intent, IntentKind::GeneralInquiry);
        assert!((c.confidence - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ranked_is_sorted() {
        let c = classify("help me check my balance history");
        for pair in c.ranked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        assert_eq!(c.ranked[0].0, c.intent);
    }
}
