//! Shared test utilities for the sweet shop.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        access::Claims,
        sweet::{self, NewSweet},
    },
    entities::{self, Sweet},
    errors::Result,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sea_orm::{ConnectionTrait, DatabaseConnection, Schema};
use tracing_subscriber::EnvFilter;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")), // Default to TRACE for tests if RUST_LOG is not set
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an in-memory database holding only the `sweets` table, so that every
/// audit insert fails.
pub async fn setup_db_without_audit_table() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    db.execute(builder.build(&schema.create_table_from_entity(Sweet)))
        .await?;
    Ok(db)
}

/// Creates a test sweet with the given fields and no description.
pub async fn create_test_sweet(
    db: &DatabaseConnection,
    name: &str,
    category: &str,
    price: f64,
    quantity: i32,
) -> Result<entities::sweet::Model> {
    sweet::create_sweet(
        db,
        NewSweet {
            name: name.to_string(),
            category: category.to_string(),
            price,
            quantity,
            description: None,
        },
    )
    .await
}

/// Sets up a database holding a single "Chocolate Truffle".
/// Returns (db, sweet) for inventory scenarios.
pub async fn setup_with_sweet(
    quantity: i32,
    price: f64,
) -> Result<(DatabaseConnection, entities::sweet::Model)> {
    let db = setup_test_db().await?;
    let sweet = create_test_sweet(&db, "Chocolate Truffle", "Chocolates", price, quantity).await?;
    Ok((db, sweet))
}

/// Builds an unsigned credential carrying `claims`.
#[allow(clippy::unwrap_used)]
pub fn create_test_token(claims: &Claims) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
    let signature = URL_SAFE_NO_PAD.encode(b"test-signature");
    format!("{header}.{payload}.{signature}")
}
