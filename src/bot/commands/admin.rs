//! Admin Discord commands - `restock`, `sales` and `sweet_manage`.
//!
//! Every command here checks the admin allowlist before calling the storefront. The
//! role in a user's credential is not enough on its own.

mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::{relay_outcome, say_ephemeral},
            handlers::{autocomplete, lookup},
        },
        core::{
            inventory::list_purchases_for_sweet,
            sweet::{NewSweet, SweetChanges},
        },
        entities::sweet,
        errors::{Error, Result},
    };
    use tracing::warn;

    /// Replies with a refusal and returns false unless the caller is an allowlisted admin.
    async fn ensure_admin(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
        let user_id = ctx.author().id.to_string();
        let data = ctx.data();
        if data.is_authorized_admin(&user_id) {
            return Ok(true);
        }

        if data.shows_admin_tools(&user_id).await {
            warn!(
                "User {} claims the admin role but is not on the admin list",
                user_id
            );
        }
        say_ephemeral(ctx, "⛔ Only shop admins can do that.").await?;
        Ok(false)
    }

    async fn find_sweet(
        ctx: poise::Context<'_, BotData, Error>,
        reference: &str,
    ) -> Result<Option<sweet::Model>> {
        let found = lookup::resolve_sweet(ctx.data().storefront.database(), reference).await?;
        if found.is_none() {
            ctx.say(format!("❌ Sweet '{reference}' not found.")).await?;
        }
        Ok(found)
    }

    /// Adds units to a sweet's stock.
    #[poise::command(slash_command)]
    pub async fn restock(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sweet to restock"]
        #[autocomplete = "autocomplete::autocomplete_sweet"]
        sweet: String,
        #[description = "Units to add. Defaults to 10."]
        #[min = 1]
        quantity: Option<i32>,
    ) -> Result<()> {
        const DEFAULT_RESTOCK: i32 = 10;

        if !ensure_admin(ctx).await? {
            return Ok(());
        }
        let Some(found) = find_sweet(ctx, &sweet).await? else {
            return Ok(());
        };

        let outcome = ctx
            .data()
            .storefront
            .restock(found.id, quantity.unwrap_or(DEFAULT_RESTOCK))
            .await;
        relay_outcome(ctx, &outcome).await
    }

    /// Shows the most recent purchases of a sweet.
    #[poise::command(slash_command)]
    pub async fn sales(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sweet to show sales for"]
        #[autocomplete = "autocomplete::autocomplete_sweet"]
        sweet: String,
    ) -> Result<()> {
        const RECENT_SALES: usize = 10;

        if !ensure_admin(ctx).await? {
            return Ok(());
        }
        let Some(found) = find_sweet(ctx, &sweet).await? else {
            return Ok(());
        };

        let purchases = list_purchases_for_sweet(ctx.data().storefront.database(), found.id).await?;
        if purchases.is_empty() {
            say_ephemeral(ctx, format!("No sales recorded for {}.", found.name)).await?;
            return Ok(());
        }

        let units: i64 = purchases.iter().map(|p| i64::from(p.quantity)).sum();
        let revenue: f64 = purchases.iter().map(|p| p.total_price).sum();
        let lines = purchases
            .iter()
            .take(RECENT_SALES)
            .map(|p| {
                format!(
                    "• {} - {} for ${:.2} by `{}`",
                    p.created_at.format("%Y-%m-%d %H:%M"),
                    p.quantity,
                    p.total_price,
                    p.user_id
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        say_ephemeral(
            ctx,
            format!(
                "**Sales for {}**\n{} sales, {units} units, ${revenue:.2} total\n{lines}",
                found.name,
                purchases.len()
            ),
        )
        .await
    }

    /// Parent command for maintaining the catalog.
    #[poise::command(
        slash_command,
        subcommands("sweet_add", "sweet_update", "sweet_delete")
    )]
    pub async fn sweet_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Catalog management command. Available subcommands:\n\
            `/sweet_manage add` - Add a new sweet\n\
            `/sweet_manage update` - Edit a sweet\n\
            `/sweet_manage delete` - Remove a sweet";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a new sweet to the catalog.
    #[poise::command(slash_command, rename = "add")]
    pub async fn sweet_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name (e.g., 'Chocolate Truffle')"] name: String,
        #[description = "Category (e.g., 'Chocolates')"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Unit price (e.g., 3.99)"] price: f64,
        #[description = "Starting stock. Defaults to 0."] quantity: Option<i32>,
        #[description = "Optional description"] description: Option<String>,
    ) -> Result<()> {
        if !ensure_admin(ctx).await? {
            return Ok(());
        }

        let outcome = ctx
            .data()
            .storefront
            .add_sweet(NewSweet {
                name,
                category,
                price,
                quantity: quantity.unwrap_or(0),
                description,
            })
            .await;
        relay_outcome(ctx, &outcome).await
    }

    /// Edits an existing sweet. Only the fields you fill in change.
    #[poise::command(slash_command, rename = "update")]
    pub async fn sweet_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sweet to edit"]
        #[autocomplete = "autocomplete::autocomplete_sweet"]
        sweet: String,
        #[description = "New name"] name: Option<String>,
        #[description = "New category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "New unit price"] price: Option<f64>,
        #[description = "New stock level"] quantity: Option<i32>,
        #[description = "New description (a single space clears it)"]
        description: Option<String>,
    ) -> Result<()> {
        if !ensure_admin(ctx).await? {
            return Ok(());
        }
        let Some(found) = find_sweet(ctx, &sweet).await? else {
            return Ok(());
        };

        let changes = SweetChanges {
            name,
            category,
            price,
            quantity,
            description,
        };
        if changes == SweetChanges::default() {
            ctx.say("Nothing to change.").await?;
            return Ok(());
        }

        let outcome = ctx.data().storefront.update_sweet(found.id, changes).await;
        relay_outcome(ctx, &outcome).await
    }

    /// Removes a sweet from the catalog. Its purchase history is kept.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn sweet_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sweet to delete"]
        #[autocomplete = "autocomplete::autocomplete_sweet"]
        sweet: String,
    ) -> Result<()> {
        if !ensure_admin(ctx).await? {
            return Ok(());
        }
        let Some(found) = find_sweet(ctx, &sweet).await? else {
            return Ok(());
        };

        let outcome = ctx.data().storefront.delete_sweet(found.id).await;
        relay_outcome(ctx, &outcome).await
    }
}

pub use inner::*;
