//! Integration tests for SMS compliance keywords and the opt-out registry.

use lastcall_core::PhoneNumber;
use lastcall_server::services::optout::{
    HELP_KEYWORDS, KeywordKind, OPTIN_KEYWORDS, OptOutRegistry, STOP_KEYWORDS, classify_keyword,
};

fn phone(s: &str) -> PhoneNumber {
    PhoneNumber::normalize(s).unwrap_or_else(|e| panic!("phone {s:?} must normalize: {e}"))
}

#[test]
fn test_every_documented_keyword_classifies() {
    for word in STOP_KEYWORDS {
        assert_eq!(classify_keyword(word), Some(KeywordKind::Stop), "{word}");
        assert_eq!(
            classify_keyword(&word.to_uppercase()),
            Some(KeywordKind::Stop),
            "{word}"
        );
    }
    for word in OPTIN_KEYWORDS {
        assert_eq!(classify_keyword(word), Some(KeywordKind::OptIn), "{word}");
    }
    for word in HELP_KEYWORDS {
        assert_eq!(classify_keyword(word), Some(KeywordKind::Help), "{word}");
    }
}

#[test]
fn test_keywords_must_be_the_whole_message() {
    assert_eq!(classify_keyword("stop it"), None);
    assert_eq!(classify_keyword("can you help"), None);
    assert_eq!(classify_keyword("start the party"), None);
}

#[test]
fn test_stop_then_start_cycle() {
    let registry = OptOutRegistry::new();
    let customer = phone("+1 555 867 5309");

    registry.opt_out(&customer);
    assert!(registry.is_opted_out(&customer));

    // Same number in the raw format a webhook would deliver.
    assert!(registry.is_opted_out(&phone("15558675309")));

    registry.opt_in(&customer);
    assert!(!registry.is_opted_out(&customer));
}

#[test]
fn test_opt_out_is_per_number() {
    let registry = OptOutRegistry::new();
    registry.opt_out(&phone("15550001111"));
    assert!(!registry.is_opted_out(&phone("15550002222")));
}
