//! Core business logic - framework-agnostic catalog, inventory and access operations.

/// Credential decoding and the admin hint
pub mod access;
/// Listing cache with refresh fencing
pub mod cache;
/// Listing filters
pub mod filter;
/// Purchases and restocks
pub mod inventory;
/// Operation layer that turns results into customer notices
pub mod storefront;
/// Catalog maintenance
pub mod sweet;
