//! Integration tests for free-text drink resolution.
//!
//! These exercise the catalog resolver end to end with realistic message
//! texts from the menu frontend and hand-typed orders, without requiring
//! a database.

use lastcall_server::catalog::{Catalog, DrinkCatalogEntry, Resolution};

fn entry(canonical: &str, display: &str, aliases: &[&str]) -> DrinkCatalogEntry {
    DrinkCatalogEntry {
        canonical_id: canonical.to_string(),
        display_name: display.to_string(),
        aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
    }
}

fn bar_catalog() -> Catalog {
    Catalog::new(vec![
        entry("margarita", "Margarita", &["marg"]),
        entry("old-fashioned", "Old Fashioned", &[]),
        entry("espresso-martini", "Espresso Martini", &["espresso", "martini"]),
        entry("negroni", "Negroni", &[]),
    ])
    .unwrap_or_else(|e| panic!("catalog must build: {e}"))
}

fn resolve_id<'a>(catalog: &'a Catalog, text: &str) -> &'a str {
    match catalog.resolve(text) {
        Resolution::Drink(e) => &e.canonical_id,
        other => panic!("expected a drink for {text:?}, got {other:?}"),
    }
}

// =============================================================================
// Menu-Button Texts
// =============================================================================

#[test]
fn test_menu_button_text_resolves() {
    let catalog = bar_catalog();
    assert_eq!(
        resolve_id(&catalog, "I'd like to order the Margarita!"),
        "margarita"
    );
    assert_eq!(
        resolve_id(&catalog, "I\u{2019}d like to order the Old Fashioned"),
        "old-fashioned"
    );
}

#[test]
fn test_menu_button_text_with_apostrophe_dropped_by_keyboard() {
    let catalog = bar_catalog();
    // Some clients strip the apostrophe entirely.
    assert_eq!(
        resolve_id(&catalog, "Id like to order the Negroni."),
        "negroni"
    );
}

// =============================================================================
// Hand-Typed Orders
// =============================================================================

#[test]
fn test_casual_typed_order() {
    let catalog = bar_catalog();
    assert_eq!(resolve_id(&catalog, "margarita"), "margarita");
    assert_eq!(resolve_id(&catalog, "MARGARITA!!"), "margarita");
    assert_eq!(resolve_id(&catalog, "one negroni please"), "negroni");
    assert_eq!(
        resolve_id(&catalog, "can i get an old fashioned?"),
        "old-fashioned"
    );
}

#[test]
fn test_alias_resolves_exactly() {
    let catalog = bar_catalog();
    assert_eq!(resolve_id(&catalog, "marg"), "margarita");
    assert_eq!(resolve_id(&catalog, "espresso"), "espresso-martini");
}

#[test]
fn test_first_catalog_entry_wins_ties() {
    let catalog = bar_catalog();
    // Text mentions two drinks; margarita is earlier in file order.
    assert_eq!(
        resolve_id(&catalog, "a margarita and a negroni"),
        "margarita"
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let catalog = bar_catalog();
    let first = resolve_id(&catalog, "negroni por favor").to_string();
    for _ in 0..10 {
        assert_eq!(resolve_id(&catalog, "negroni por favor"), first);
    }
}

// =============================================================================
// Non-Orders
// =============================================================================

#[test]
fn test_unknown_drink_is_not_found() {
    let catalog = bar_catalog();
    assert_eq!(
        catalog.resolve("two pints of lager"),
        Resolution::NotFound
    );
}

#[test]
fn test_whatsapp_tutorial_noise_is_ignored() {
    let catalog = bar_catalog();
    assert_eq!(
        catalog.resolve("Take a minute to learn how this works"),
        Resolution::Noise
    );
    // Even when a drink name appears inside the boilerplate.
    assert_eq!(
        catalog.resolve("Take a minute to browse, the margarita is great"),
        Resolution::Noise
    );
}

#[test]
fn test_empty_and_punctuation_only() {
    let catalog = bar_catalog();
    assert_eq!(catalog.resolve(""), Resolution::NotFound);
    assert_eq!(catalog.resolve("  !?  "), Resolution::NotFound);
}
