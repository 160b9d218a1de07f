/// Database configuration and connection management
pub mod database;

/// Shop settings and seed catalog loading from config.toml
pub mod catalog;

/// Admin allowlist configuration from environment variables
pub mod admins;
