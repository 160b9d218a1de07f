//! Autocomplete handlers for Discord slash command parameters.
//!
//! This module suggests sweets and categories as the user types, so that command
//! parameters match catalog entries exactly.

use crate::{
    bot::{BotData, handlers::lookup::format_reference},
    core::filter::{ALL_CATEGORIES, SweetFilter, fetch_sweets},
    errors::Error,
};

/// Discord's limit on autocomplete choices.
const MAX_CHOICES: usize = 25;

/// Provides autocomplete suggestions for sweets.
///
/// Queries the catalog for sweets whose name contains the partial input and returns
/// them as `Name #id`, in name order.
///
/// # Arguments
/// * `ctx` - The poise context containing the storefront
/// * `partial` - The partial string the user has typed so far
pub async fn autocomplete_sweet(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = ctx.data().storefront.database();
    let filter = SweetFilter {
        search: partial.trim().to_string(),
        ..Default::default()
    };

    let Ok(sweets) = fetch_sweets(db, &filter).await else {
        return Vec::new();
    };

    sweets
        .iter()
        .map(format_reference)
        .take(MAX_CHOICES)
        .collect()
}

/// Provides autocomplete suggestions for categories.
///
/// Categories come from the storefront's cache, which always holds the full category set.
/// The `all` option is offered first.
pub async fn autocomplete_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let storefront = &ctx.data().storefront;
    if let Err(e) = storefront.ensure_loaded().await {
        tracing::warn!("Could not load categories for autocomplete: {}", e);
    }

    let partial_lower = partial.to_lowercase();
    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(storefront.cache().categories().await)
        .filter(|category| category.to_lowercase().contains(&partial_lower))
        .take(MAX_CHOICES)
        .collect()
}
