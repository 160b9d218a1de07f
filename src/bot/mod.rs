//! Bot layer - Discord-specific storefront and command handlers
//!
//! This module provides the Discord interface for the sweet shop: browsing and buying for
//! customers, stock and catalog management for admins, and the shared bot context.

/// Discord command implementations (shop, admin, account, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, sweet lookups)
pub mod handlers;

use crate::{
    core::{access::SessionStore, storefront::Storefront},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::collections::HashSet;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// Holds the storefront (database plus inventory cache), the logged-in credentials,
/// and the allowlist that authorizes admin operations.
pub struct BotData {
    /// Catalog operations and cache
    pub storefront: Storefront,
    /// Bearer credentials by Discord user ID
    pub sessions: SessionStore,
    /// Discord user IDs allowed to run admin operations
    pub admin_ids: HashSet<String>,
}

impl BotData {
    /// Creates a new `BotData` instance with no one logged in.
    #[must_use]
    pub fn new(storefront: Storefront, admin_ids: HashSet<String>) -> Self {
        Self {
            storefront,
            sessions: SessionStore::new(),
            admin_ids,
        }
    }

    /// Whether `user_id` may run admin operations. This is the authoritative check.
    #[must_use]
    pub fn is_authorized_admin(&self, user_id: &str) -> bool {
        self.admin_ids.contains(user_id)
    }

    /// Whether admin commands should be advertised to `user_id`.
    ///
    /// True for allowlisted users and for users whose credential claims the admin role.
    pub async fn shows_admin_tools(&self, user_id: &str) -> bool {
        self.is_authorized_admin(user_id)
            || crate::core::access::is_admin(self.sessions.current_user(user_id).await.as_ref())
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Registers the slash commands and runs the bot until the gateway connection ends.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::login(),
                commands::logout(),
                commands::whoami(),
                commands::sweets(),
                commands::categories(),
                commands::purchase(),
                commands::restock(),
                commands::sales(),
                commands::sweet_manage(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
