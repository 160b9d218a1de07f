//! Sweet business logic - Catalog maintenance for the shop.
//!
//! This module provides functions for creating, retrieving, updating and deleting sweets,
//! along with the field rules every write has to pass. Stock changes driven by sales and
//! restocks live in [`crate::core::inventory`]; the functions here only set quantities
//! directly when an admin edits a sweet.

use crate::{
    config::catalog::SweetSeed,
    entities::{Sweet, sweet},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};
use tracing::{info, instrument};

/// Longest allowed sweet name, in characters.
pub const MAX_NAME_LEN: usize = 100;
/// Longest allowed category, in characters.
pub const MAX_CATEGORY_LEN: usize = 50;
/// Longest allowed description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Fields for a sweet that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSweet {
    /// Display name
    pub name: String,
    /// Category
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Starting stock
    pub quantity: i32,
    /// Optional description; blank is stored as null
    pub description: Option<String>,
}

/// Partial update for an existing sweet. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweetChanges {
    /// New display name
    pub name: Option<String>,
    /// New category
    pub category: Option<String>,
    /// New unit price
    pub price: Option<f64>,
    /// New absolute stock level
    pub quantity: Option<i32>,
    /// New description; `Some("")` clears it
    pub description: Option<String>,
}

impl From<SweetSeed> for NewSweet {
    fn from(seed: SweetSeed) -> Self {
        Self {
            name: seed.name,
            category: seed.category,
            price: seed.price,
            quantity: seed.quantity,
            description: seed.description,
        }
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_category(category: &str) -> Result<String> {
    let category = category.trim();
    if category.is_empty() {
        return Err(Error::validation("Category is required"));
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(Error::validation(format!(
            "Category must be at most {MAX_CATEGORY_LEN} characters"
        )));
    }
    Ok(category.to_string())
}

fn validate_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::validation("Price must be a non-negative number"));
    }
    Ok(price)
}

fn validate_quantity(quantity: i32) -> Result<i32> {
    if quantity < 0 {
        return Err(Error::validation("Quantity must be non-negative"));
    }
    Ok(quantity)
}

fn normalize_description(description: Option<&str>) -> Result<Option<String>> {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::validation(format!(
            "Description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(Some(description.to_string()))
}

/// Retrieves a sweet by its unique ID.
pub async fn get_sweet_by_id(db: &DatabaseConnection, sweet_id: i64) -> Result<Option<sweet::Model>> {
    Sweet::find_by_id(sweet_id).one(db).await.map_err(Into::into)
}

/// Finds a sweet by exact name. Names are not unique, so the oldest match wins.
pub async fn get_sweet_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<sweet::Model>> {
    Sweet::find()
        .filter(sweet::Column::Name.eq(name.trim()))
        .order_by_asc(sweet::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every distinct category in the catalog, ascending.
///
/// This always looks at the whole catalog, independent of whatever filter the
/// current listing uses.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<String>> {
    Sweet::find()
        .select_only()
        .column(sweet::Column::Category)
        .distinct()
        .order_by_asc(sweet::Column::Category)
        .into_tuple::<String>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a sweet to the catalog after validating every field.
///
/// # Errors
/// Returns an error if:
/// - The name or category is blank or too long
/// - The price is negative or not finite (NaN, infinity)
/// - The quantity is negative
/// - The description is too long
/// - The database insert operation fails
#[instrument(skip(db))]
pub async fn create_sweet(db: &DatabaseConnection, new_sweet: NewSweet) -> Result<sweet::Model> {
    let name = validate_name(&new_sweet.name)?;
    let category = validate_category(&new_sweet.category)?;
    let price = validate_price(new_sweet.price)?;
    let quantity = validate_quantity(new_sweet.quantity)?;
    let description = normalize_description(new_sweet.description.as_deref())?;

    let now = chrono::Utc::now().naive_utc();
    let sweet = sweet::ActiveModel {
        name: Set(name),
        category: Set(category),
        price: Set(price),
        quantity: Set(quantity),
        description: Set(description),
        image_url: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = sweet.insert(db).await?;
    info!("Added sweet '{}' (ID: {})", created.name, created.id);
    Ok(created)
}

/// Applies a partial update to an existing sweet and refreshes its timestamp.
///
/// # Errors
/// Returns an error if any supplied field breaks the same rules as [`create_sweet`],
/// if the sweet does not exist, or if the database update fails.
#[instrument(skip(db))]
pub async fn update_sweet(
    db: &DatabaseConnection,
    sweet_id: i64,
    changes: SweetChanges,
) -> Result<sweet::Model> {
    let name = changes.name.as_deref().map(validate_name).transpose()?;
    let category = changes.category.as_deref().map(validate_category).transpose()?;
    let price = changes.price.map(validate_price).transpose()?;
    let quantity = changes.quantity.map(validate_quantity).transpose()?;
    let description = changes
        .description
        .as_deref()
        .map(|d| normalize_description(Some(d)))
        .transpose()?;

    let mut sweet: sweet::ActiveModel = Sweet::find_by_id(sweet_id)
        .one(db)
        .await?
        .ok_or(Error::SweetNotFound { id: sweet_id })?
        .into();

    if let Some(name) = name {
        sweet.name = Set(name);
    }
    if let Some(category) = category {
        sweet.category = Set(category);
    }
    if let Some(price) = price {
        sweet.price = Set(price);
    }
    if let Some(quantity) = quantity {
        sweet.quantity = Set(quantity);
    }
    if let Some(description) = description {
        sweet.description = Set(description);
    }
    sweet.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = sweet.update(db).await?;
    info!("Updated sweet '{}' (ID: {})", updated.name, updated.id);
    Ok(updated)
}

/// Removes a sweet from the catalog. Purchase records that reference it are kept.
///
/// # Errors
/// Returns an error if the sweet does not exist or the delete fails.
#[instrument(skip(db))]
pub async fn delete_sweet(db: &DatabaseConnection, sweet_id: i64) -> Result<()> {
    let result = Sweet::delete_by_id(sweet_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::SweetNotFound { id: sweet_id });
    }
    info!("Deleted sweet ID {}", sweet_id);
    Ok(())
}

/// Inserts the configured seed sweets, but only into an empty catalog.
///
/// Returns the number of sweets inserted.
#[instrument(skip(db, seeds))]
pub async fn seed_catalog(db: &DatabaseConnection, seeds: &[SweetSeed]) -> Result<usize> {
    if seeds.is_empty() {
        return Ok(0);
    }
    let existing = Sweet::find().count(db).await?;
    if existing > 0 {
        info!("Catalog already holds {} sweets, skipping seed", existing);
        return Ok(0);
    }

    for seed in seeds {
        create_sweet(db, NewSweet::from(seed.clone())).await?;
    }
    info!("Seeded catalog with {} sweets", seeds.len());
    Ok(seeds.len())
}
