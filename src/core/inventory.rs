//! Inventory business logic - Purchases and restocks against the stock counter.
//!
//! Stock is never changed with a read-modify-write. Both operations push the arithmetic
//! into a single conditional `UPDATE` and look at the affected row count, so two
//! customers buying the last units at the same time cannot both succeed:
//!
//! `UPDATE sweets SET quantity = quantity - n WHERE id = ? AND quantity >= n`
//!
//! A purchase also writes a [`purchase`] audit row. What happens when that write fails
//! is decided by [`AuditPolicy`].

use crate::{
    entities::{Purchase, Sweet, purchase, sweet},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// How a purchase treats a failed audit insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditPolicy {
    /// The stock decrement stands on its own; a failed audit insert is logged and
    /// the purchase still succeeds without a receipt record.
    #[default]
    BestEffort,
    /// Decrement and audit commit together; a failed audit insert rolls the
    /// decrement back and fails the purchase.
    Required,
}

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseReceipt {
    /// Sweet that was sold
    pub sweet_id: i64,
    /// Its name at the time of sale
    pub sweet_name: String,
    /// Units sold
    pub quantity: i32,
    /// Unit price times quantity
    pub total_price: f64,
    /// The audit row, or `None` if it could not be written under [`AuditPolicy::BestEffort`]
    pub audit: Option<purchase::Model>,
}

/// Result of a successful restock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockReceipt {
    /// Sweet that was restocked
    pub sweet_id: i64,
    /// Its name at the time of the restock
    pub sweet_name: String,
    /// Units added
    pub added: i32,
}

/// Atomically takes `quantity` units out of stock.
///
/// Returns the sweet as it was read before the decrement, which carries the unit
/// price the sale is charged at.
async fn take_stock<C>(db: &C, sweet_id: i64, quantity: i32) -> Result<sweet::Model>
where
    C: ConnectionTrait,
{
    let sweet = Sweet::find_by_id(sweet_id)
        .one(db)
        .await?
        .ok_or(Error::SweetNotFound { id: sweet_id })?;

    if sweet.quantity < quantity {
        return Err(Error::InsufficientStock {
            available: sweet.quantity,
            requested: quantity,
        });
    }

    let result = Sweet::update_many()
        .col_expr(
            sweet::Column::Quantity,
            Expr::col(sweet::Column::Quantity).sub(quantity),
        )
        .col_expr(
            sweet::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(sweet::Column::Id.eq(sweet_id))
        .filter(sweet::Column::Quantity.gte(quantity))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        // Someone else got there between the read and the update
        let current = Sweet::find_by_id(sweet_id)
            .one(db)
            .await?
            .ok_or(Error::SweetNotFound { id: sweet_id })?;
        return Err(Error::InsufficientStock {
            available: current.quantity,
            requested: quantity,
        });
    }

    Ok(sweet)
}

async fn record_purchase<C>(
    db: &C,
    user_id: &str,
    sweet_id: i64,
    quantity: i32,
    total_price: f64,
) -> Result<purchase::Model>
where
    C: ConnectionTrait,
{
    let record = purchase::ActiveModel {
        user_id: Set(user_id.to_string()),
        sweet_id: Set(sweet_id),
        quantity: Set(quantity),
        total_price: Set(total_price),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    record.insert(db).await.map_err(Into::into)
}

/// Sells `quantity` units of a sweet to `user_id`.
///
/// The stock decrement is applied before the audit record is written. The returned
/// receipt does not contain the new stock level; refetch the sweet to see it.
///
/// # Errors
/// Returns an error if:
/// - `quantity` is less than one
/// - The sweet does not exist
/// - Fewer than `quantity` units are in stock, including when a concurrent purchase
///   took them first (no stock is changed in that case)
/// - The database update fails, or the audit insert fails under [`AuditPolicy::Required`]
#[instrument(skip(db))]
pub async fn purchase(
    db: &DatabaseConnection,
    sweet_id: i64,
    quantity: i32,
    user_id: &str,
    policy: AuditPolicy,
) -> Result<PurchaseReceipt> {
    if quantity < 1 {
        return Err(Error::validation("Purchase quantity must be at least 1"));
    }

    let (sweet, audit) = match policy {
        AuditPolicy::BestEffort => {
            let sweet = take_stock(db, sweet_id, quantity).await?;
            let total_price = sweet.price * f64::from(quantity);
            let audit = match record_purchase(db, user_id, sweet_id, quantity, total_price).await {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        "Stock for sweet {} decremented by {} but the audit record failed: {}",
                        sweet_id, quantity, e
                    );
                    None
                }
            };
            (sweet, audit)
        }
        AuditPolicy::Required => {
            let txn = db.begin().await?;
            let sweet = take_stock(&txn, sweet_id, quantity).await?;
            let total_price = sweet.price * f64::from(quantity);
            let record = record_purchase(&txn, user_id, sweet_id, quantity, total_price).await?;
            txn.commit().await?;
            (sweet, Some(record))
        }
    };

    let receipt = PurchaseReceipt {
        sweet_id,
        sweet_name: sweet.name,
        quantity,
        total_price: sweet.price * f64::from(quantity),
        audit,
    };
    info!(
        "User {} purchased {} x '{}' for ${:.2}",
        user_id, quantity, receipt.sweet_name, receipt.total_price
    );
    Ok(receipt)
}

/// Adds `added` units to a sweet's stock. No audit record is written.
///
/// Only positive amounts are accepted; stock corrections downward go through
/// [`crate::core::sweet::update_sweet`].
///
/// # Errors
/// Returns an error if `added` is less than one, if the sweet does not exist, if the
/// new stock level would not fit the counter, or if the database update fails.
#[instrument(skip(db))]
pub async fn restock(db: &DatabaseConnection, sweet_id: i64, added: i32) -> Result<RestockReceipt> {
    if added < 1 {
        return Err(Error::validation("Restock quantity must be at least 1"));
    }

    let sweet = Sweet::find_by_id(sweet_id)
        .one(db)
        .await?
        .ok_or(Error::SweetNotFound { id: sweet_id })?;

    let result = Sweet::update_many()
        .col_expr(
            sweet::Column::Quantity,
            Expr::col(sweet::Column::Quantity).add(added),
        )
        .col_expr(
            sweet::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(sweet::Column::Id.eq(sweet_id))
        .filter(sweet::Column::Quantity.lte(i32::MAX - added))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        if Sweet::find_by_id(sweet_id).one(db).await?.is_none() {
            return Err(Error::SweetNotFound { id: sweet_id });
        }
        return Err(Error::validation(format!(
            "Restocking '{}' by {added} would exceed the maximum stock level",
            sweet.name
        )));
    }

    info!("Restocked '{}' (ID: {}) with {} units", sweet.name, sweet_id, added);
    Ok(RestockReceipt {
        sweet_id,
        sweet_name: sweet.name,
        added,
    })
}

/// Retrieves the purchase history for a sweet, newest first.
pub async fn list_purchases_for_sweet(
    db: &DatabaseConnection,
    sweet_id: i64,
) -> Result<Vec<purchase::Model>> {
    Purchase::find()
        .filter(purchase::Column::SweetId.eq(sweet_id))
        .order_by_desc(purchase::Column::CreatedAt)
        .order_by_desc(purchase::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::sweet::get_sweet_by_id;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase, PaginatorTrait};

    async fn stock_of(db: &DatabaseConnection, sweet_id: i64) -> Result<i32> {
        Ok(get_sweet_by_id(db, sweet_id).await?.unwrap().quantity)
    }

    #[tokio::test]
    async fn test_purchase_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        for quantity in [0, -1] {
            let result = purchase(&db, 1, quantity, "user1", AuditPolicy::BestEffort).await;
            assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_decrements_and_records() -> Result<()> {
        let (db, sweet) = setup_with_sweet(5, 2.0).await?;

        let receipt = purchase(&db, sweet.id, 3, "user1", AuditPolicy::BestEffort).await?;

        assert_eq!(receipt.quantity, 3);
        assert_eq!(receipt.total_price, 6.0);
        assert_eq!(stock_of(&db, sweet.id).await?, 2);

        let audit = receipt.audit.unwrap();
        assert_eq!(audit.total_price, 6.0);
        assert_eq!(audit.quantity, 3);
        assert_eq!(audit.user_id, "user1");

        let history = list_purchases_for_sweet(&db, sweet.id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], audit);
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_insufficient_stock_leaves_everything_alone() -> Result<()> {
        let (db, sweet) = setup_with_sweet(5, 2.0).await?;

        let result = purchase(&db, sweet.id, 10, "user1", AuditPolicy::BestEffort).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                available: 5,
                requested: 10
            }
        ));

        assert_eq!(stock_of(&db, sweet.id).await?, 5);
        assert_eq!(Purchase::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_entire_stock() -> Result<()> {
        let (db, sweet) = setup_with_sweet(4, 1.5).await?;
        purchase(&db, sweet.id, 4, "user1", AuditPolicy::Required).await?;
        assert_eq!(stock_of(&db, sweet.id).await?, 0);

        let result = purchase(&db, sweet.id, 1, "user1", AuditPolicy::Required).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock { available: 0, .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_unknown_sweet() -> Result<()> {
        let db = setup_test_db().await?;
        for policy in [AuditPolicy::BestEffort, AuditPolicy::Required] {
            let result = purchase(&db, 42, 1, "user1", policy).await;
            assert!(matches!(result.unwrap_err(), Error::SweetNotFound { id: 42 }));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_purchases_cannot_oversell() -> Result<()> {
        let (db, sweet) = setup_with_sweet(5, 2.0).await?;

        let (first, second) = tokio::join!(
            purchase(&db, sweet.id, 3, "user1", AuditPolicy::BestEffort),
            purchase(&db, sweet.id, 3, "user2", AuditPolicy::BestEffort),
        );

        let results = [first, second];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, Error::InsufficientStock { .. }))
        );

        assert_eq!(stock_of(&db, sweet.id).await?, 2);
        assert_eq!(Purchase::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_best_effort_keeps_decrement_when_audit_fails() -> Result<()> {
        let db = setup_db_without_audit_table().await?;
        let sweet = create_test_sweet(&db, "Truffle", "Chocolates", 2.0, 5).await?;

        let receipt = purchase(&db, sweet.id, 3, "user1", AuditPolicy::BestEffort).await?;

        assert!(receipt.audit.is_none());
        assert_eq!(receipt.total_price, 6.0);
        assert_eq!(stock_of(&db, sweet.id).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_required_rolls_back_decrement_when_audit_fails() -> Result<()> {
        let db = setup_db_without_audit_table().await?;
        let sweet = create_test_sweet(&db, "Truffle", "Chocolates", 2.0, 5).await?;

        let result = purchase(&db, sweet.id, 3, "user1", AuditPolicy::Required).await;

        assert!(matches!(result.unwrap_err(), Error::Database(_)));
        assert_eq!(stock_of(&db, sweet.id).await?, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_restock_adds_without_audit() -> Result<()> {
        let (db, sweet) = setup_with_sweet(2, 2.0).await?;

        let receipt = restock(&db, sweet.id, 20).await?;

        assert_eq!(receipt.added, 20);
        assert_eq!(receipt.sweet_name, sweet.name);
        assert_eq!(stock_of(&db, sweet.id).await?, 22);
        assert_eq!(Purchase::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_restock_rejects_non_positive() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        for added in [0, -5] {
            let result = restock(&db, 1, added).await;
            assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_restock_unknown_sweet() -> Result<()> {
        let db = setup_test_db().await?;
        let result = restock(&db, 7, 5).await;
        assert!(matches!(result.unwrap_err(), Error::SweetNotFound { id: 7 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_restock_overflow_rejected() -> Result<()> {
        let (db, sweet) = setup_with_sweet(i32::MAX - 1, 1.0).await?;

        let result = restock(&db, sweet.id, 2).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        assert_eq!(stock_of(&db, sweet.id).await?, i32::MAX - 1);

        restock(&db, sweet.id, 1).await?;
        assert_eq!(stock_of(&db, sweet.id).await?, i32::MAX);
        Ok(())
    }

    #[tokio::test]
    async fn test_stock_never_negative_over_mixed_sequence() -> Result<()> {
        let (db, sweet) = setup_with_sweet(3, 1.0).await?;
        let mut expected = 3;
        let mut seed: u32 = 17;

        for _ in 0..60 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let amount = i32::try_from((seed >> 16) % 5).unwrap() + 1;

            if seed % 3 == 0 {
                restock(&db, sweet.id, amount).await?;
                expected += amount;
            } else {
                match purchase(&db, sweet.id, amount, "user1", AuditPolicy::BestEffort).await {
                    Ok(_) => expected -= amount,
                    Err(Error::InsufficientStock { available, .. }) => {
                        assert!(available < amount);
                    }
                    Err(e) => return Err(e),
                }
            }

            let stock = stock_of(&db, sweet.id).await?;
            assert!(stock >= 0);
            assert_eq!(stock, expected);
        }
        Ok(())
    }
}
