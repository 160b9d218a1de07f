//! Sweet entity - One item in the shop catalog.
//!
//! Each sweet has a name, a free-form category, a unit price and a stock counter.
//! The `quantity` column is the only field touched by purchases and restocks and
//! must never go below zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sweet database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sweets")]
pub struct Model {
    /// Unique identifier, assigned by the store
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Chocolate Truffle")
    pub name: String,
    /// Free-form category (e.g., "Chocolates"); new categories appear as sweets use them
    pub category: String,
    /// Unit price in dollars
    pub price: f64,
    /// Units currently in stock
    pub quantity: i32,
    /// Optional longer description
    pub description: Option<String>,
    /// Optional image location, not populated by any current flow
    pub image_url: Option<String>,
    /// When the sweet was created
    pub created_at: DateTime,
    /// When the sweet was last modified
    pub updated_at: DateTime,
}

/// Purchases reference sweets by id only, so no relations are declared
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Stock badge shown next to a sweet in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    /// More than [`LOW_STOCK_THRESHOLD`] units
    InStock,
    /// Between one and [`LOW_STOCK_THRESHOLD`] units
    Low,
    /// Nothing left to sell
    OutOfStock,
}

/// Highest quantity still shown as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

impl StockLevel {
    /// Classifies a stock counter.
    #[must_use]
    pub const fn from_quantity(quantity: i32) -> Self {
        if quantity > LOW_STOCK_THRESHOLD {
            Self::InStock
        } else if quantity > 0 {
            Self::Low
        } else {
            Self::OutOfStock
        }
    }
}

impl Model {
    /// Stock badge for this sweet.
    #[must_use]
    pub const fn stock_level(&self) -> StockLevel {
        StockLevel::from_quantity(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_level_boundaries() {
        assert_eq!(StockLevel::from_quantity(11), StockLevel::InStock);
        assert_eq!(StockLevel::from_quantity(10), StockLevel::Low);
        assert_eq!(StockLevel::from_quantity(1), StockLevel::Low);
        assert_eq!(StockLevel::from_quantity(0), StockLevel::OutOfStock);
    }
}
