//! Admin allowlist loaded from environment variables.
//!
//! The role carried in a customer's credential only decides which commands are
//! advertised. Whether an admin operation actually runs is decided here, from the
//! `SHOP_ADMIN_IDS` variable in the `.env` file.

use std::collections::HashSet;

/// Parses a comma-separated list of chat user IDs, ignoring blanks.
#[must_use]
pub fn parse_admin_ids(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Reads `SHOP_ADMIN_IDS` from the environment.
///
/// Returns an empty set when the variable is not configured, which leaves every
/// admin operation locked.
#[must_use]
pub fn get_admin_ids() -> HashSet<String> {
    std::env::var("SHOP_ADMIN_IDS")
        .map(|raw| parse_admin_ids(&raw))
        .unwrap_or_default()
}
