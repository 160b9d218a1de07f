//! Discord command implementations organized by audience.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Login, logout and identity commands
pub mod account;

/// Admin-only stock and catalog commands
pub mod admin;

/// General utility commands
pub mod general;

/// Customer browsing and purchasing commands
pub mod shop;

// Export commands
pub use account::*;
pub use admin::*;
pub use general::*;
pub use shop::*;

use crate::{
    bot::BotData,
    core::storefront::Outcome,
    errors::{Error, Result},
};

/// Sends an operation's notice back to the user.
pub(crate) async fn relay_outcome(
    ctx: poise::Context<'_, BotData, Error>,
    outcome: &Outcome,
) -> Result<()> {
    let marker = if outcome.success { "✅" } else { "❌" };
    ctx.say(format!("{marker} {}", outcome.notice)).await?;
    Ok(())
}

/// Replies only the invoking user can see.
pub(crate) async fn say_ephemeral(
    ctx: poise::Context<'_, BotData, Error>,
    content: impl Into<String>,
) -> Result<()> {
    ctx.send(
        poise::CreateReply::default()
            .content(content.into())
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
