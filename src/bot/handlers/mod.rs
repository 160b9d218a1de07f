//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete and
//! resolving the sweet a customer referred to.

/// Autocomplete handlers for sweet names and categories
pub mod autocomplete;
/// Turning a typed sweet reference into a catalog record
pub mod lookup;
