//! Seed the stock ledger from the drink catalog file.
//!
//! Reads the catalog JSON, validates it (duplicate canonical ids are
//! rejected before any row is touched), and upserts each entry. Existing
//! rows keep their stock count; only display names are refreshed, so
//! re-seeding in production never resets inventory. New rows start at the
//! given stock count.

use std::path::Path;

use secrecy::SecretString;
use tracing::info;

use lastcall_server::catalog::Catalog;
use lastcall_server::db::{self, DrinkRepository};

/// Upsert catalog entries into the `drinks` table.
///
/// # Errors
///
/// Returns an error if environment variables are missing, the catalog file
/// cannot be read or parsed, or a database operation fails.
pub async fn drinks(file_path: &str, initial_stock: i32) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("LASTCALL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "LASTCALL_DATABASE_URL not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading drink catalog");

    // Parse and validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog = Catalog::from_json(&content)?;
    info!(entries = catalog.len(), "Parsed catalog");

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = DrinkRepository::new(&pool);
    let mut created = 0;
    let mut updated = 0;

    for entry in catalog.entries() {
        let existing = repo.get_by_canonical(&entry.canonical_id).await?;
        if existing.is_some() {
            repo.upsert(&entry.canonical_id, &entry.display_name).await?;
            updated += 1;
        } else {
            repo.create(&entry.canonical_id, &entry.display_name, initial_stock)
                .await?;
            created += 1;
        }
    }

    info!("Seeding complete!");
    info!("  Drinks created: {created}");
    info!("  Drinks updated: {updated}");

    Ok(())
}
