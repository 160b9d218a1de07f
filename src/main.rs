#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use std::env;
use sweet_shop::{
    bot::{self, BotData},
    config::{admins, catalog, database},
    core::{storefront::Storefront, sweet},
    errors::{Error, Result},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Shop settings and seed catalog
    let config = catalog::load_default_config()
        .inspect_err(|e| error!("Critical error loading config.toml: {}", e))?;
    info!(
        "Loaded shop configuration with {} seed sweets.",
        config.sweets.len()
    );

    // 4. Database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the catalog on first start
    sweet::seed_catalog(&db, &config.sweets)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;

    let storefront = Storefront::new(db, config.shop.audit_policy);
    info!("Purchases use the {:?} audit policy.", storefront.audit_policy());
    let admin_ids = admins::get_admin_ids();
    if admin_ids.is_empty() {
        warn!("SHOP_ADMIN_IDS is empty, nobody can restock or edit the catalog");
    }

    // 6. Run the bot. The token is read right before use and never stored.
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(storefront, admin_ids)).await
}
