//! Shop configuration loading from config.toml
//!
//! The file carries the shop-wide settings and an optional list of sweets used to
//! seed an empty catalog on first run.

use crate::core::inventory::AuditPolicy;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Shop-wide settings
    #[serde(default)]
    pub shop: ShopSettings,
    /// Sweets to seed into an empty catalog
    #[serde(default)]
    pub sweets: Vec<SweetSeed>,
}

/// Shop-wide settings
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ShopSettings {
    /// What a purchase does when its audit record cannot be written
    #[serde(default)]
    pub audit_policy: AuditPolicy,
}

/// Configuration for a single seeded sweet
#[derive(Debug, Deserialize, Clone)]
pub struct SweetSeed {
    /// Display name
    pub name: String,
    /// Category
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Starting stock
    #[serde(default)]
    pub quantity: i32,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Loads the shop configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the configuration from the default location (./config.toml).
///
/// A missing file is not an error: the shop starts with default settings and an
/// unseeded catalog.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if !path.exists() {
        tracing::warn!("config.toml not found, using default shop settings");
        return Ok(Config::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_shop_config() {
        let toml_str = r#"
            [shop]
            audit_policy = "required"

            [[sweets]]
            name = "Chocolate Truffle"
            category = "Chocolates"
            price = 2.5
            quantity = 40
            description = "Dark chocolate ganache"

            [[sweets]]
            name = "Gummy Bear"
            category = "Gummies"
            price = 0.25
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.shop.audit_policy, AuditPolicy::Required);
        assert_eq!(config.sweets.len(), 2);
        assert_eq!(config.sweets[0].name, "Chocolate Truffle");
        assert_eq!(config.sweets[0].quantity, 40);
        assert_eq!(config.sweets[1].price, 0.25);
        assert_eq!(config.sweets[1].quantity, 0);
        assert!(config.sweets[1].description.is_none());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.shop.audit_policy, AuditPolicy::BestEffort);
        assert!(config.sweets.is_empty());
    }

    #[test]
    fn test_unknown_audit_policy_rejected() {
        let result: std::result::Result<Config, _> =
            toml::from_str("[shop]\naudit_policy = \"sometimes\"");
        assert!(result.is_err());
    }
}
