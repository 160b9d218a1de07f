//! Sweet lookups for command parameters.
//!
//! Autocomplete offers sweets as `Name #id`, but customers can also type a bare id
//! (`12` or `#12`) or an exact name. An exact name always wins, so a sweet called
//! "Gift Box #1" is never mistaken for sweet 1.

use crate::{
    core::sweet::{get_sweet_by_id, get_sweet_by_name},
    entities::sweet,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// What a customer typed to pick a sweet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweetReference {
    /// A bare catalog ID
    Id(i64),
    /// `Name #id`, as offered by autocomplete
    Tagged {
        /// Name part before the `#`
        name: String,
        /// Catalog ID after the `#`
        id: i64,
    },
    /// Anything else, taken as an exact name
    Name(String),
}

/// Formats a sweet the way autocomplete offers it.
#[must_use]
pub fn format_reference(sweet: &sweet::Model) -> String {
    format!("{} #{}", sweet.name, sweet.id)
}

/// Parses a typed reference.
#[must_use]
pub fn parse_reference(input: &str) -> SweetReference {
    let input = input.trim();
    if let Some((name, id)) = input.rsplit_once('#') {
        if let Ok(id) = id.trim().parse::<i64>() {
            let name = name.trim();
            return if name.is_empty() {
                SweetReference::Id(id)
            } else {
                SweetReference::Tagged {
                    name: name.to_string(),
                    id,
                }
            };
        }
    }

    match input.parse::<i64>() {
        Ok(id) => SweetReference::Id(id),
        Err(_) => SweetReference::Name(input.to_string()),
    }
}

/// Resolves a typed reference to a sweet, if one exists.
///
/// An exact name match is tried first. A `Name #id` reference only resolves when the
/// sweet with that id still carries that name.
pub async fn resolve_sweet(db: &DatabaseConnection, input: &str) -> Result<Option<sweet::Model>> {
    let input = input.trim();
    if let Some(found) = get_sweet_by_name(db, input).await? {
        return Ok(Some(found));
    }

    match parse_reference(input) {
        SweetReference::Id(id) => get_sweet_by_id(db, id).await,
        SweetReference::Tagged { name, id } => {
            Ok(get_sweet_by_id(db, id).await?.filter(|found| found.name == name))
        }
        SweetReference::Name(_) => Ok(None),
    }
}
