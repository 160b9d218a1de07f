//! Account Discord commands - `login`, `logout` and `whoami`.
//!
//! Credentials are issued by the shop's auth service; the bot only stores them per
//! Discord user and reads the claims to decide what to show.

mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::say_ephemeral},
        errors::{Error, Result},
    };
    use tracing::info;

    /// Signs in with a shop credential.
    ///
    /// The reply is only visible to the caller.
    #[poise::command(slash_command)]
    pub async fn login(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Bearer token from the shop's login page"] token: String,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();

        match ctx.data().sessions.login(&user_id, &token).await {
            Ok(claims) => {
                info!("Discord user {} logged in as {}", user_id, claims.id);
                say_ephemeral(
                    ctx,
                    format!("✅ Logged in as `{}` (role: {})", claims.id, claims.role),
                )
                .await
            }
            Err(e) => say_ephemeral(ctx, format!("❌ Could not use that credential: {e}")).await,
        }
    }

    /// Signs out and forgets the stored credential.
    #[poise::command(slash_command)]
    pub async fn logout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        if ctx.data().sessions.logout(&user_id).await {
            say_ephemeral(ctx, "👋 Logged out.").await
        } else {
            say_ephemeral(ctx, "You were not logged in.").await
        }
    }

    /// Shows who you are signed in as.
    #[poise::command(slash_command)]
    pub async fn whoami(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let data = ctx.data();

        let Some(claims) = data.sessions.current_user(&user_id).await else {
            return say_ephemeral(ctx, "Not logged in. Use `/login` with your shop credential.")
                .await;
        };

        let admin_note = if data.is_authorized_admin(&user_id) {
            "admin tools enabled"
        } else if claims.is_admin() {
            "admin role claimed, but this account is not on the admin list"
        } else {
            "customer"
        };
        say_ephemeral(
            ctx,
            format!(
                "Logged in as `{}` (role: {}) - {admin_note}",
                claims.id, claims.role
            ),
        )
        .await
    }
}

pub use inner::*;
