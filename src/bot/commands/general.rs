//! General Discord commands - ping and help.
//! These commands don't touch the catalog and provide basic bot functionality.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    const CUSTOMER_HELP: &str = "**Sweet Shop Help**\n\
        Browse the catalog and buy your favourite sweets.\n\n\
        **Shopping**\n\
        • `/sweets [search] [category] [min_price] [max_price]` - Lists sweets, optionally filtered.\n\
        • `/categories` - Lists every category in the shop.\n\
        • `/purchase <sweet> [quantity]` - Buys a sweet.\n\n\
        **Account**\n\
        • `/login <token>` - Signs in with your shop credential.\n\
        • `/logout` - Signs out.\n\
        • `/whoami` - Shows who you are signed in as.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

    const ADMIN_HELP: &str = "\n\n**Admin Tools**\n\
        • `/restock <sweet> [quantity]` - Adds units to a sweet's stock.\n\
        • `/sales <sweet>` - Shows recent purchases of a sweet.\n\
        • `/sweet_manage add|update|delete` - Maintains the catalog.";

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    ///
    /// Admin tools are only listed for users who are admins or signed in with an admin credential.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let mut help_text = CUSTOMER_HELP.to_string();
        if ctx.data().shows_admin_tools(&user_id).await {
            help_text.push_str(ADMIN_HELP);
        }

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
