//! Shop Discord commands - `sweets`, `categories` and `purchase`.
//!
//! Listings come from the storefront's cache, which is refreshed with the requested
//! filter before it is shown.

use crate::entities::sweet::{self, StockLevel};

/// Embeds hold at most this many fields.
pub const MAX_LISTED: usize = 25;

/// Stock badge text for a sweet.
#[must_use]
pub fn stock_badge(sweet: &sweet::Model) -> String {
    match sweet.stock_level() {
        StockLevel::InStock => format!("🟢 {} in stock", sweet.quantity),
        StockLevel::Low => format!("🟡 {} in stock", sweet.quantity),
        StockLevel::OutOfStock => "🔴 Out of Stock".to_string(),
    }
}

/// Embed field (title, body) for one sweet in a listing.
#[must_use]
pub fn listing_field(sweet: &sweet::Model) -> (String, String) {
    let title = format!("{} - ${:.2}", sweet.name, sweet.price);
    let mut body = format!("{} · {} · #{}", stock_badge(sweet), sweet.category, sweet.id);
    if let Some(description) = &sweet.description {
        body.push('\n');
        body.push_str(description);
    }
    (title, body)
}

mod inner {
    #![allow(missing_docs)]

    use super::{MAX_LISTED, listing_field};
    use crate::{
        bot::{
            BotData,
            commands::relay_outcome,
            handlers::{autocomplete, lookup},
        },
        core::filter::{ALL_CATEGORIES, SweetFilter},
        errors::{Error, ErrorKind, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Lists sweets, optionally filtered by name, category and price range.
    #[poise::command(slash_command, prefix_command)]
    pub async fn sweets(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part of the name to search for"] search: Option<String>,
        #[description = "Only show this category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "Lowest price to include"] min_price: Option<f64>,
        #[description = "Highest price to include"] max_price: Option<f64>,
    ) -> Result<()> {
        let filter = SweetFilter {
            search: search.unwrap_or_default(),
            category: category.unwrap_or_else(|| ALL_CATEGORIES.to_string()),
            min_price,
            max_price,
        };

        let snapshot = match ctx.data().storefront.browse(filter).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.kind() == ErrorKind::Validation => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
            Err(e) => {
                tracing::error!("Error fetching sweets: {}", e);
                ctx.say("❌ Failed to load sweets").await?;
                return Ok(());
            }
        };

        if snapshot.sweets.is_empty() {
            ctx.say("No sweets match those filters.").await?;
            return Ok(());
        }

        let fields = snapshot
            .sweets
            .iter()
            .take(MAX_LISTED)
            .map(|sweet| {
                let (title, body) = listing_field(sweet);
                (title, body, false)
            });

        let mut embed = serenity::CreateEmbed::default()
            .title("**Sweet Shop**")
            .color(0x00FF_69B4)
            .fields(fields);
        if snapshot.sweets.len() > MAX_LISTED {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Showing {MAX_LISTED} of {} sweets. Narrow the search to see more.",
                snapshot.sweets.len()
            )));
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists every category in the shop.
    #[poise::command(slash_command, prefix_command)]
    pub async fn categories(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let storefront = &ctx.data().storefront;
        if let Err(e) = storefront.ensure_loaded().await {
            tracing::error!("Error fetching categories: {}", e);
            ctx.say("❌ Failed to load categories").await?;
            return Ok(());
        }

        let categories = storefront.cache().categories().await;
        if categories.is_empty() {
            ctx.say("The shop has no sweets yet.").await?;
            return Ok(());
        }

        let list = categories
            .iter()
            .map(|category| format!("• {category}"))
            .collect::<Vec<_>>()
            .join("\n");
        ctx.say(format!("**Categories**\n{list}")).await?;
        Ok(())
    }

    /// Buys a sweet.
    ///
    /// The purchase is recorded against your shop account if you are logged in, and
    /// against your Discord account otherwise.
    #[poise::command(slash_command, prefix_command)]
    pub async fn purchase(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sweet to buy"]
        #[autocomplete = "autocomplete::autocomplete_sweet"]
        sweet: String,
        #[description = "How many to buy. Defaults to 1."]
        #[min = 1]
        quantity: Option<i32>,
    ) -> Result<()> {
        let data = ctx.data();
        let author_id = ctx.author().id.to_string();

        let Some(found) = lookup::resolve_sweet(data.storefront.database(), &sweet).await? else {
            ctx.say(format!(
                "❌ Sweet '{sweet}' not found. Use `/sweets` to see what's available."
            ))
            .await?;
            return Ok(());
        };

        let buyer_id = data
            .sessions
            .current_user(&author_id)
            .await
            .map(|claims| claims.id)
            .filter(|id| !id.is_empty())
            .unwrap_or(author_id);

        let outcome = data
            .storefront
            .purchase(found.id, quantity.unwrap_or(1), &buyer_id)
            .await;
        relay_outcome(ctx, &outcome).await
    }
}

pub use inner::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sweet(quantity: i32, description: Option<&str>) -> sweet::Model {
        let now = Utc::now().naive_utc();
        sweet::Model {
            id: 3,
            name: "Chocolate Truffle".to_string(),
            category: "Chocolates".to_string(),
            price: 2.0,
            quantity,
            description: description.map(ToString::to_string),
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_stock_badges() {
        assert_eq!(stock_badge(&sweet(50, None)), "🟢 50 in stock");
        assert_eq!(stock_badge(&sweet(4, None)), "🟡 4 in stock");
        assert_eq!(stock_badge(&sweet(0, None)), "🔴 Out of Stock");
    }

    #[test]
    fn test_listing_field() {
        let (title, body) = listing_field(&sweet(4, Some("Dark ganache")));
        assert_eq!(title, "Chocolate Truffle - $2.00");
        assert_eq!(body, "🟡 4 in stock · Chocolates · #3\nDark ganache");

        let (_, body) = listing_field(&sweet(0, None));
        assert_eq!(body, "🔴 Out of Stock · Chocolates · #3");
    }
}
