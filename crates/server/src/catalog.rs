//! Drink catalog and free-text order resolution.
//!
//! The catalog is loaded from a JSON file as an *ordered* list of entries.
//! Resolution is deliberately simple: normalize the incoming text, then try
//! an exact match, then substring containment, first entry in file order
//! wins. There is no ranking or scoring, so behavior is reproducible and
//! testable.
//!
//! # Hot reload
//!
//! [`CatalogHandle`] holds the current snapshot behind an `RwLock<Arc<_>>`.
//! `reload()` parses the file off to the side and swaps the snapshot in one
//! atomic store; resolutions that already took a snapshot finish against it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Polite order prefix produced by the menu frontend's order buttons,
/// e.g. `"I'd like to order the Margarita"` (straight or curly apostrophe).
static ORDER_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^i['\u{2019}]?d\s+like\s+to\s+order\s+the\s+").expect("Invalid regex")
});

/// Onboarding tutorial boilerplate that WhatsApp sends on first contact.
/// Treated as noise, never as an order.
const TUTORIAL_NOISE: &str = "take a minute";

/// Errors that can occur when loading the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not valid JSON.
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two entries share a canonical id.
    #[error("duplicate canonical id in catalog: {0}")]
    DuplicateCanonicalId(String),
}

/// One menu item as configured in the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrinkCatalogEntry {
    /// Stable internal identifier, unique across the catalog.
    pub canonical_id: String,
    /// User-facing name shown on the menu and in notifications.
    pub display_name: String,
    /// Extra phrases that resolve to this entry on exact match.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Outcome of resolving a free-text order phrase.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The text resolved to a catalog entry.
    Drink(&'a DrinkCatalogEntry),
    /// No entry matched; the customer should be pointed at the menu.
    NotFound,
    /// Known boilerplate, not an order. Ignore silently, send no reply.
    Noise,
}

/// An immutable catalog snapshot, preserving file order.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<DrinkCatalogEntry>,
}

impl Catalog {
    /// Build a catalog from already-parsed entries.
    ///
    /// # Errors
    ///
    /// Returns an error if two entries share a canonical id.
    pub fn new(entries: Vec<DrinkCatalogEntry>) -> Result<Self, CatalogError> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i]
                .iter()
                .any(|e| e.canonical_id.eq_ignore_ascii_case(&entry.canonical_id))
            {
                return Err(CatalogError::DuplicateCanonicalId(entry.canonical_id.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid JSON or duplicate canonical ids.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<DrinkCatalogEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// Number of entries in this snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[DrinkCatalogEntry] {
        &self.entries
    }

    /// Resolve a free-text order phrase to a catalog entry.
    ///
    /// Lookup order:
    /// 1. exact match of the normalized key against canonical id, display
    ///    name, or an alias (case-insensitive),
    /// 2. substring containment: the key *contains* an entry's canonical id
    ///    or display name.
    ///
    /// First entry in file order wins in both passes.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Resolution<'_> {
        let stripped = strip_order_prefix(raw);
        let key = normalize_key(stripped);

        if key.contains(TUTORIAL_NOISE) {
            return Resolution::Noise;
        }
        if key.is_empty() {
            return Resolution::NotFound;
        }

        let exact = self.entries.iter().find(|e| {
            e.canonical_id.eq_ignore_ascii_case(&key)
                || e.display_name.eq_ignore_ascii_case(&key)
                || e.aliases.iter().any(|a| a.eq_ignore_ascii_case(&key))
        });
        if let Some(entry) = exact {
            return Resolution::Drink(entry);
        }

        let contained = self.entries.iter().find(|e| {
            key.contains(&e.canonical_id.to_lowercase())
                || key.contains(&e.display_name.to_lowercase())
        });
        match contained {
            Some(entry) => Resolution::Drink(entry),
            None => Resolution::NotFound,
        }
    }
}

/// Strip the polite order prefix, if present.
///
/// Idempotent: the prefix cannot occur in its own output.
#[must_use]
pub fn strip_order_prefix(raw: &str) -> &str {
    let trimmed = raw.trim();
    match ORDER_PREFIX_RE.find(trimmed) {
        Some(m) => trimmed[m.end()..].trim_start(),
        None => trimmed,
    }
}

/// Normalize an order phrase into its lookup key.
///
/// Removes apostrophes (straight and curly), strips trailing punctuation
/// and sentence terminators, and lowercases. Each step is idempotent.
#[must_use]
pub fn normalize_key(stripped: &str) -> String {
    let no_apostrophes: String = stripped.chars().filter(|c| !matches!(c, '\'' | '\u{2019}')).collect();
    no_apostrophes
        .trim_end_matches(|c: char| {
            c.is_whitespace() || matches!(c, '!' | '?' | '.' | ',' | ';' | ':' | '\u{3002}' | '\u{FF0C}')
        })
        .trim()
        .to_lowercase()
}

/// Shared handle to the current catalog snapshot.
///
/// Constructed once at startup and owned by the application state. Each
/// resolution takes the current `Arc` and works against one consistent
/// snapshot; [`CatalogHandle::reload`] swaps in a new one atomically.
#[derive(Debug)]
pub struct CatalogHandle {
    path: PathBuf,
    current: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    /// Load the catalog from the given file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let catalog = read_catalog(&path)?;
        Ok(Self {
            path,
            current: RwLock::new(Arc::new(catalog)),
        })
    }

    /// Build a handle around an in-memory catalog (used in tests).
    #[must_use]
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            path: PathBuf::new(),
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Re-read the catalog file and swap the snapshot atomically.
    ///
    /// On failure the previous snapshot stays in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn reload(&self) -> Result<usize, CatalogError> {
        let catalog = read_catalog(&self.path)?;
        let count = catalog.len();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(catalog);
        Ok(count)
    }
}

fn read_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Catalog::from_json(&json)
}
