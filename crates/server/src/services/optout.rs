//! SMS compliance: carrier keyword handling and the opt-out registry.
//!
//! Carriers require that STOP-family keywords halt all messaging to a
//! number immediately and that HELP gets a support reply. Keyword matching
//! is full-message: "stop" opts out, "stop sending margaritas" does not
//! (that is carrier behavior too).

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use lastcall_core::PhoneNumber;

/// Keywords that opt a number out of all messaging.
pub const STOP_KEYWORDS: &[&str] = &["stop", "stopall", "unsubscribe", "cancel", "end", "quit"];

/// Keywords that opt a number back in.
pub const OPTIN_KEYWORDS: &[&str] = &["start", "yes", "subscribe", "join", "unstop"];

/// Keywords that trigger a support reply.
pub const HELP_KEYWORDS: &[&str] = &["help", "info", "support"];

/// How an inbound SMS body maps to compliance handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    Stop,
    OptIn,
    Help,
}

/// Classify a message body as a compliance keyword, if it is one.
///
/// The whole trimmed message must be the keyword.
#[must_use]
pub fn classify_keyword(body: &str) -> Option<KeywordKind> {
    let word = body.trim().to_lowercase();
    if STOP_KEYWORDS.contains(&word.as_str()) {
        Some(KeywordKind::Stop)
    } else if OPTIN_KEYWORDS.contains(&word.as_str()) {
        Some(KeywordKind::OptIn)
    } else if HELP_KEYWORDS.contains(&word.as_str()) {
        Some(KeywordKind::Help)
    } else {
        None
    }
}

/// In-memory registry of opted-out numbers.
///
/// Held per process; carriers enforce STOP at their edge as well, this
/// registry exists so the application never even attempts a send.
#[derive(Debug, Default)]
pub struct OptOutRegistry {
    numbers: Mutex<HashSet<String>>,
}

impl OptOutRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.numbers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an opt-out.
    pub fn opt_out(&self, number: &PhoneNumber) {
        self.lock().insert(number.as_str().to_string());
    }

    /// Remove an opt-out.
    pub fn opt_in(&self, number: &PhoneNumber) {
        self.lock().remove(number.as_str());
    }

    /// Whether sends to this number are blocked.
    #[must_use]
    pub fn is_opted_out(&self, number: &PhoneNumber) -> bool {
        self.lock().contains(number.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn phone(s: &str) -> PhoneNumber {
        PhoneNumber::normalize(s).unwrap()
    }

    #[test]
    fn test_classify_full_message_only() {
        assert_eq!(classify_keyword("STOP"), Some(KeywordKind::Stop));
        assert_eq!(classify_keyword("  stop  "), Some(KeywordKind::Stop));
        assert_eq!(classify_keyword("unsubscribe"), Some(KeywordKind::Stop));
        assert_eq!(classify_keyword("start"), Some(KeywordKind::OptIn));
        assert_eq!(classify_keyword("HELP"), Some(KeywordKind::Help));

        // Keywords embedded in longer messages are not keywords.
        assert_eq!(classify_keyword("stop sending margaritas"), None);
        assert_eq!(classify_keyword("please help me"), None);
    }

    #[test]
    fn test_opt_out_roundtrip() {
        let registry = OptOutRegistry::new();
        let number = phone("+1 555 000 1111");

        assert!(!registry.is_opted_out(&number));
        registry.opt_out(&number);
        assert!(registry.is_opted_out(&number));
        registry.opt_in(&number);
        assert!(!registry.is_opted_out(&number));
    }

    #[test]
    fn test_opt_out_matches_across_formats() {
        let registry = OptOutRegistry::new();
        registry.opt_out(&phone("+1 (555) 000-1111"));
        assert!(registry.is_opted_out(&phone("15550001111")));
    }
}
