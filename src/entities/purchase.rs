//! Purchase entity - Audit record written after a successful sale.
//!
//! Rows are only ever inserted. `sweet_id` is kept as a plain column without a
//! foreign key so that the audit trail survives deleting the sweet.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    /// Unique identifier for the purchase
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity of the buyer
    pub user_id: String,
    /// ID of the sweet that was sold
    pub sweet_id: i64,
    /// Units sold, always positive
    pub quantity: i32,
    /// Unit price at the time of sale multiplied by `quantity`
    pub total_price: f64,
    /// When the sale happened
    pub created_at: DateTimeUtc,
}

/// `Purchase` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
