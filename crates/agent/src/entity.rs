//! Entity extraction
//!
//! Regex-based scanner pulling structured values out of raw customer text.
//! No side effects, never fails; a field is present only when something
//! matched. When a pattern matches more than once, the first occurrence
//! wins. That tie-break is arbitrary but load-bearing: the verification flow
//! relies on it, so keep it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{6,}\b").unwrap());
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").unwrap());
static NAME_IS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)name is").unwrap());

/// Words that are never part of a customer name.
const NAME_STOPWORDS: &[&str] = &["my", "name", "is", "and", "account", "number"];

/// Contact field a customer wants to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateField {
    Email,
    Phone,
    Address,
}

impl UpdateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateField::Email => "email",
            UpdateField::Phone => "phone",
            UpdateField::Address => "address",
        }
    }
}

/// Entities recognized in a single message
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractedEntities {
    /// First run of 6+ digits
    pub account_number: Option<String>,
    /// Candidate full name, when a name heuristic fired
    pub full_name: Option<String>,
    /// Which contact field an update refers to
    pub update_field: Option<UpdateField>,
    pub new_email: Option<String>,
    pub new_phone: Option<String>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.account_number.is_none()
            && self.full_name.is_none()
            && self.update_field.is_none()
            && self.new_email.is_none()
            && self.new_phone.is_none()
    }
}

/// Extract all recognizable entities from a message.
pub fn extract(message: &str) -> ExtractedEntities {
    let lower = message.to_lowercase();

    let account_number = ACCOUNT_RE
        .find(message)
        .map(|m| m.as_str().to_string());

    let mut entities = ExtractedEntities {
        full_name: extract_name(message, account_number.as_deref()),
        account_number,
        ..Default::default()
    };

    // Update-target inference. Order matters: a later keyword overrides an
    // earlier one, matching the reference behavior.
    if lower.contains("email") {
        entities.update_field = Some(UpdateField::Email);
        entities.new_email = EMAIL_RE.find(message).map(|m| m.as_str().to_string());
    }
    if lower.contains("phone") || lower.contains("number") {
        entities.update_field = Some(UpdateField::Phone);
        entities.new_phone = PHONE_RE.find(message).map(|m| m.as_str().to_string());
    }
    if lower.contains("address") {
        entities.update_field = Some(UpdateField::Address);
    }

    entities
}

/// Name heuristic, known weak point.
///
/// "name is X Y Z" takes up to three following words minus stopwords;
/// otherwise the last two alphabetic words before the account number are
/// treated as first and last name.
fn extract_name(message: &str, account_number: Option<&str>) -> Option<String> {
    // Case-insensitive match on the original string; slicing a lowercased
    // copy's offset back into the original is not safe (lowercasing can
    // change byte lengths).
    if let Some(m) = NAME_IS_RE.find(message) {
        let tail = &message[m.end()..];
        let words: Vec<&str> = tail
            .split_whitespace()
            .take(3)
            .map(|w| w.trim_matches(|c| matches!(c, '.' | ',' | '!' | '?')))
            .filter(|w| !NAME_STOPWORDS.contains(&w.to_lowercase().as_str()))
            .filter(|w| !w.is_empty())
            .collect();
        if !words.is_empty() {
            return Some(words.join(" "));
        }
    }

    let account = account_number?;
    let mut name_words: Vec<&str> = Vec::new();
    for word in message.split_whitespace() {
        if word == account {
            break;
        }
        let clean = word.trim_matches(|c| matches!(c, '.' | ','));
        if clean.chars().all(|c| c.is_alphabetic())
            && !clean.is_empty()
            && !NAME_STOPWORDS.contains(&clean.to_lowercase().as_str())
        {
            name_words.push(clean);
        }
    }
    if name_words.len() >= 2 {
        Some(name_words[name_words.len() - 2..].join(" "))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_number_first_run_wins() {
        let entities = extract("accounts 1234567890 and 9876543210");
        assert_eq!(entities.account_number.as_deref(), Some("1234567890"));
    }

    #[test]
    fn test_short_digit_runs_ignored() {
        let entities = extract("I have 12345 dollars");
        assert!(entities.account_number.is_none());
    }

    #[test]
    fn test_name_is_pattern() {
        let entities =
            extract("My name is John Doe and my account number is 1234567890");
        assert_eq!(entities.full_name.as_deref(), Some("John Doe"));
        assert_eq!(entities.account_number.as_deref(), Some("1234567890"));
    }

    #[test]
    fn test_name_is_pattern_any_case() {
        let entities = extract("MY NAME IS John Doe");
        assert_eq!(entities.full_name.as_deref(), Some("John Doe"));
    }

    #[test]
    fn test_name_after_multibyte_text() {
        // Lowercasing 'İ' grows the string by a byte; the match offset must
        // come from the original text, not a lowercased copy
        let entities = extract("İİ name is Ünal");
        assert_eq!(entities.full_name.as_deref(), Some("Ünal"));
    }

    #[test]
    fn test_name_before_account_fallback() {
        let entities = extract("John Doe 1234567890");
        assert_eq!(entities.full_name.as_deref(), Some("John Doe"));
    }

    #[test]
    fn test_email_update() {
        let entities = extract("Please change my email to jane@example.com");
        assert_eq!(entities.update_field, Some(UpdateField::Email));
        assert_eq!(entities.new_email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_phone_update() {
        let entities = extract("Update my phone to 555-123-4567");
        assert_eq!(entities.update_field, Some(UpdateField::Phone));
        assert_eq!(entities.new_phone.as_deref(), Some("555-123-4567"));
    }

    #[test]
    fn test_address_update_no_value() {
        let entities = extract("I need to update my address");
        assert_eq!(entities.update_field, Some(UpdateField::Address));
        assert!(entities.new_email.is_none());
        assert!(entities.new_phone.is_none());
    }

    #[test]
    fn test_no_entities() {
        let entities = extract("Hello there");
        assert!(entities.is_empty());
    }
}
