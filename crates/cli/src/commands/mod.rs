//! CLI command implementations.

pub mod migrate;
pub mod shipment;

use secrecy::SecretString;

/// Read the database URL, preferring `LASTMILE_DATABASE_URL` over `DATABASE_URL`.
fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var("LASTMILE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.is_empty())
        .map(SecretString::from)
}
