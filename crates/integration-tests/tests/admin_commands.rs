//! Integration tests for the operator command grammar and allow-list.

use lastcall_core::{OrderId, PhoneNumber};
use lastcall_server::commands::{AdminCommand, AdminRegistry, parse_command};

fn phone(s: &str) -> PhoneNumber {
    PhoneNumber::normalize(s).unwrap_or_else(|e| panic!("phone {s:?} must normalize: {e}"))
}

// =============================================================================
// Grammar
// =============================================================================

#[test]
fn test_grammar_accepts_documented_forms() {
    assert_eq!(parse_command("queue"), Some(AdminCommand::Queue));
    assert_eq!(parse_command("CLEAR"), Some(AdminCommand::Clear));
    assert_eq!(parse_command("2"), Some(AdminCommand::ServeByPosition(2)));
    assert_eq!(
        parse_command("done id 42"),
        Some(AdminCommand::ServeById(OrderId::new(42)))
    );
    assert_eq!(
        parse_command("id 42"),
        Some(AdminCommand::ServeById(OrderId::new(42)))
    );
}

#[test]
fn test_grammar_rejects_everything_else() {
    // These must fall through to the order flow, not error.
    assert_eq!(parse_command("margarita"), None);
    assert_eq!(parse_command("2 margaritas"), None);
    assert_eq!(parse_command("queue up a negroni"), None);
    assert_eq!(parse_command("done"), None);
    assert_eq!(parse_command("id"), None);
    assert_eq!(parse_command("0"), None);
    assert_eq!(parse_command("-3"), None);
}

// =============================================================================
// Allow-List Gating
// =============================================================================

#[test]
fn test_commands_only_from_allow_listed_numbers() {
    let registry = AdminRegistry::new(vec![phone("+44 7911 123456")], false);

    // The admin's own number works in any delivered format.
    assert_eq!(
        registry.parse(&phone("447911123456"), "queue"),
        Some(AdminCommand::Queue)
    );

    // A customer typing "queue" is ordering nothing and commanding nothing;
    // the text falls through to the resolver.
    assert_eq!(registry.parse(&phone("15550009999"), "queue"), None);
}

#[test]
fn test_admin_ordering_a_drink_falls_through() {
    let registry = AdminRegistry::new(vec![phone("15550001111")], false);
    // An admin's non-command text is not swallowed by the parser.
    assert_eq!(registry.parse(&phone("15550001111"), "margarita"), None);
}

#[test]
fn test_open_access_requires_explicit_flag() {
    let closed = AdminRegistry::new(vec![], false);
    assert_eq!(closed.parse(&phone("15550009999"), "clear"), None);

    let open = AdminRegistry::new(vec![], true);
    assert_eq!(
        open.parse(&phone("15550009999"), "clear"),
        Some(AdminCommand::Clear)
    );
}

#[test]
fn test_open_access_flag_ignored_once_list_is_populated() {
    let registry = AdminRegistry::new(vec![phone("15550001111")], true);
    assert_eq!(registry.parse(&phone("15550009999"), "queue"), None);
}
