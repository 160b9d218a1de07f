//! Storefront - The operation layer between the chat commands and the catalog.
//!
//! Each mutating operation runs the core function, refreshes the [`InventoryCache`]
//! whether or not anything else changed, and hands back an [`Outcome`] instead of an
//! error. Commands only ever relay the outcome's notice to the customer.

use crate::{
    core::{
        cache::{CacheSnapshot, InventoryCache},
        filter::{SweetFilter, fetch_sweets},
        inventory::{self, AuditPolicy},
        sweet::{self, NewSweet, SweetChanges},
    },
    errors::{Error, ErrorKind, Result},
};
use sea_orm::DatabaseConnection;
use tracing::{debug, error, info, warn};

/// Result of a storefront operation, ready to show to the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Whether the operation took effect
    pub success: bool,
    /// Message for the customer
    pub notice: String,
    /// Failure category, `None` on success
    pub failure: Option<ErrorKind>,
}

impl Outcome {
    fn succeeded(notice: impl Into<String>) -> Self {
        Self {
            success: true,
            notice: notice.into(),
            failure: None,
        }
    }

    fn failed(action: &str, err: &Error) -> Self {
        let kind = err.kind();
        let notice = match (kind, err) {
            (ErrorKind::Validation, Error::Validation { message }) => message.clone(),
            (ErrorKind::NotFound, _) => "That sweet no longer exists".to_string(),
            (ErrorKind::InsufficientStock, Error::InsufficientStock { available, .. }) => {
                format!("Not enough stock available (only {available} left)")
            }
            (ErrorKind::Auth, _) => "Please log in again".to_string(),
            _ => format!("Failed to {action}"),
        };

        match kind {
            ErrorKind::Store | ErrorKind::Internal => error!("Failed to {}: {}", action, err),
            _ => info!("Rejected attempt to {}: {}", action, err),
        }

        Self {
            success: false,
            notice,
            failure: Some(kind),
        }
    }
}

/// Catalog operations plus the cache they keep fresh.
#[derive(Debug)]
pub struct Storefront {
    db: DatabaseConnection,
    cache: InventoryCache,
    audit_policy: AuditPolicy,
}

impl Storefront {
    /// Creates a storefront with an empty cache.
    #[must_use]
    pub fn new(db: DatabaseConnection, audit_policy: AuditPolicy) -> Self {
        Self {
            db,
            cache: InventoryCache::new(),
            audit_policy,
        }
    }

    /// Database handle for read-only lookups.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The storefront's cache.
    #[must_use]
    pub const fn cache(&self) -> &InventoryCache {
        &self.cache
    }

    /// Audit policy applied to purchases.
    #[must_use]
    pub const fn audit_policy(&self) -> AuditPolicy {
        self.audit_policy
    }

    /// Makes `filter` the active filter, refreshes the cache, and returns the listing
    /// for `filter`.
    ///
    /// The cache is shared, so another browse may have replaced the active filter before
    /// this refresh landed. The returned listing always matches `filter` regardless.
    /// A malformed filter is rejected before it replaces the active one.
    pub async fn browse(&self, filter: SweetFilter) -> Result<CacheSnapshot> {
        filter.validate()?;
        self.cache.set_filter(filter.clone()).await;
        self.cache.refresh(&self.db).await?;
        self.listing_for(filter, self.cache.snapshot().await).await
    }

    /// Answers `filter` from `snapshot` when it was fetched with the same filter.
    ///
    /// Otherwise narrows an unconstrained snapshot in memory, or fetches directly.
    async fn listing_for(&self, filter: SweetFilter, snapshot: CacheSnapshot) -> Result<CacheSnapshot> {
        if snapshot.filter == filter {
            return Ok(snapshot);
        }

        debug!(
            "Cache holds {:?}, answering {:?} separately",
            snapshot.filter, filter
        );
        let sweets = if snapshot.token > 0 && snapshot.filter == SweetFilter::default() {
            snapshot
                .sweets
                .into_iter()
                .filter(|sweet| filter.matches(sweet))
                .collect()
        } else {
            fetch_sweets(&self.db, &filter).await?
        };
        Ok(CacheSnapshot {
            sweets,
            filter,
            ..snapshot
        })
    }

    /// Fills the cache with the active filter if nothing has been fetched yet.
    pub async fn ensure_loaded(&self) -> Result<()> {
        if self.cache.snapshot().await.token == 0 {
            self.cache.refresh(&self.db).await?;
        }
        Ok(())
    }

    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.cache.refresh(&self.db).await {
            warn!("Cache refresh after mutation failed: {}", e);
        }
    }

    /// Sells `quantity` units of a sweet to `user_id`.
    pub async fn purchase(&self, sweet_id: i64, quantity: i32, user_id: &str) -> Outcome {
        let result =
            inventory::purchase(&self.db, sweet_id, quantity, user_id, self.audit_policy).await;
        self.refresh_after_mutation().await;
        match result {
            Ok(receipt) => Outcome::succeeded(format!(
                "Successfully purchased {} {} for ${:.2}!",
                receipt.quantity, receipt.sweet_name, receipt.total_price
            )),
            Err(e) => Outcome::failed("complete purchase", &e),
        }
    }

    /// Adds `quantity` units to a sweet's stock.
    pub async fn restock(&self, sweet_id: i64, quantity: i32) -> Outcome {
        let result = inventory::restock(&self.db, sweet_id, quantity).await;
        self.refresh_after_mutation().await;
        match result {
            Ok(receipt) => Outcome::succeeded(format!(
                "Restocked {} with {} units",
                receipt.sweet_name, receipt.added
            )),
            Err(e) => Outcome::failed("restock sweet", &e),
        }
    }

    /// Adds a sweet to the catalog.
    pub async fn add_sweet(&self, new_sweet: NewSweet) -> Outcome {
        let result = sweet::create_sweet(&self.db, new_sweet).await;
        self.refresh_after_mutation().await;
        match result {
            Ok(created) => Outcome::succeeded(format!("Sweet '{}' added successfully!", created.name)),
            Err(e) => Outcome::failed("add sweet", &e),
        }
    }

    /// Applies a partial update to a sweet.
    pub async fn update_sweet(&self, sweet_id: i64, changes: SweetChanges) -> Outcome {
        let result = sweet::update_sweet(&self.db, sweet_id, changes).await;
        self.refresh_after_mutation().await;
        match result {
            Ok(updated) => {
                Outcome::succeeded(format!("Sweet '{}' updated successfully!", updated.name))
            }
            Err(e) => Outcome::failed("update sweet", &e),
        }
    }

    /// Removes a sweet from the catalog.
    pub async fn delete_sweet(&self, sweet_id: i64) -> Outcome {
        let result = sweet::delete_sweet(&self.db, sweet_id).await;
        self.refresh_after_mutation().await;
        match result {
            Ok(()) => Outcome::succeeded("Sweet deleted successfully!"),
            Err(e) => Outcome::failed("delete sweet", &e),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{cache::RefreshOutcome, sweet::list_categories};
    use crate::test_utils::*;

    async fn setup_storefront() -> Result<(Storefront, i64)> {
        let db = setup_test_db().await?;
        let sweet = create_test_sweet(&db, "Chocolate Truffle", "Chocolates", 2.0, 5).await?;
        Ok((Storefront::new(db, AuditPolicy::BestEffort), sweet.id))
    }

    #[tokio::test]
    async fn test_purchase_success_refreshes_cache() -> Result<()> {
        let (shop, sweet_id) = setup_storefront().await?;
        shop.browse(SweetFilter::default()).await?;

        let outcome = shop.purchase(sweet_id, 3, "user1").await;
        assert!(outcome.success);
        assert_eq!(outcome.failure, None);
        assert_eq!(
            outcome.notice,
            "Successfully purchased 3 Chocolate Truffle for $6.00!"
        );

        let cached = shop.cache().sweets().await;
        assert_eq!(cached[0].quantity, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_failure_is_an_outcome() -> Result<()> {
        let (shop, sweet_id) = setup_storefront().await?;

        let outcome = shop.purchase(sweet_id, 10, "user1").await;
        assert!(!outcome.success);
        assert_eq!(outcome.failure, Some(ErrorKind::InsufficientStock));
        assert_eq!(outcome.notice, "Not enough stock available (only 5 left)");

        let outcome = shop.purchase(999, 1, "user1").await;
        assert_eq!(outcome.failure, Some(ErrorKind::NotFound));

        let outcome = shop.purchase(sweet_id, 0, "user1").await;
        assert_eq!(outcome.failure, Some(ErrorKind::Validation));
        assert_eq!(outcome.notice, "Purchase quantity must be at least 1");
        Ok(())
    }

    #[tokio::test]
    async fn test_mutations_keep_active_filter() -> Result<()> {
        let (shop, sweet_id) = setup_storefront().await?;
        create_test_sweet(shop.database(), "Gummy Bear", "Gummies", 0.25, 50).await?;

        let snapshot = shop
            .browse(SweetFilter {
                search: "gummy".to_string(),
                ..Default::default()
            })
            .await?;
        assert_eq!(snapshot.sweets.len(), 1);

        let outcome = shop.restock(sweet_id, 20).await;
        assert!(outcome.success);
        assert_eq!(outcome.notice, "Restocked Chocolate Truffle with 20 units");

        let snapshot = shop.cache().snapshot().await;
        assert_eq!(snapshot.sweets.len(), 1);
        assert_eq!(snapshot.sweets[0].name, "Gummy Bear");
        assert_eq!(snapshot.filter.search, "gummy");
        Ok(())
    }

    #[tokio::test]
    async fn test_add_update_delete_refresh_categories() -> Result<()> {
        let (shop, sweet_id) = setup_storefront().await?;
        shop.browse(SweetFilter::default()).await?;

        let outcome = shop
            .add_sweet(NewSweet {
                name: "Lemon Drop".to_string(),
                category: "Hard Candy".to_string(),
                price: 0.75,
                quantity: 30,
                description: None,
            })
            .await;
        assert!(outcome.success);
        assert_eq!(
            shop.cache().categories().await,
            vec!["Chocolates".to_string(), "Hard Candy".to_string()]
        );

        let outcome = shop
            .update_sweet(
                sweet_id,
                SweetChanges {
                    category: Some("Truffles".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(outcome.success);
        assert!(shop.cache().categories().await.contains(&"Truffles".to_string()));

        let outcome = shop.delete_sweet(sweet_id).await;
        assert!(outcome.success);
        assert_eq!(shop.cache().sweets().await.len(), 1);
        assert_eq!(
            shop.cache().categories().await,
            vec!["Hard Candy".to_string()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_add_validation_notice() -> Result<()> {
        let (shop, _) = setup_storefront().await?;
        let outcome = shop
            .add_sweet(NewSweet {
                name: String::new(),
                category: "Chocolates".to_string(),
                price: 1.0,
                quantity: 1,
                description: None,
            })
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.failure, Some(ErrorKind::Validation));
        assert_eq!(outcome.notice, "Name is required");
        Ok(())
    }

    #[tokio::test]
    async fn test_listing_follows_requested_filter_after_overtaken_refresh() -> Result<()> {
        let (shop, _) = setup_storefront().await?;
        create_test_sweet(shop.database(), "Gummy Bear", "Gummies", 0.25, 50).await?;
        let cache = shop.cache();
        let chocolates = SweetFilter {
            category: "Chocolates".to_string(),
            ..Default::default()
        };
        let gummies = SweetFilter {
            category: "Gummies".to_string(),
            ..Default::default()
        };

        // First customer's refresh is issued, then overtaken by a second customer's
        cache.set_filter(chocolates.clone()).await;
        let first = cache.begin_refresh().await;
        cache.set_filter(gummies.clone()).await;
        let second = cache.begin_refresh().await;

        let db = shop.database();
        let categories = list_categories(db).await?;
        let second_sweets = fetch_sweets(db, &second.filter).await?;
        cache
            .complete_refresh(second, second_sweets, categories.clone())
            .await;
        let first_sweets = fetch_sweets(db, &first.filter).await?;
        let outcome = cache.complete_refresh(first, first_sweets, categories).await;
        assert!(matches!(outcome, RefreshOutcome::Discarded { .. }));

        let listing = shop
            .listing_for(chocolates.clone(), cache.snapshot().await)
            .await?;
        assert_eq!(listing.filter, chocolates);
        assert_eq!(listing.sweets.len(), 1);
        assert_eq!(listing.sweets[0].name, "Chocolate Truffle");
        assert_eq!(cache.snapshot().await.filter, gummies);
        Ok(())
    }

    #[tokio::test]
    async fn test_listing_narrows_unconstrained_snapshot() -> Result<()> {
        let (shop, _) = setup_storefront().await?;
        create_test_sweet(shop.database(), "Gummy Bear", "Gummies", 0.25, 50).await?;
        let everything = shop.browse(SweetFilter::default()).await?;
        assert_eq!(everything.sweets.len(), 2);

        let search = SweetFilter {
            search: "bear".to_string(),
            ..Default::default()
        };
        let listing = shop.listing_for(search.clone(), everything).await?;
        assert_eq!(listing.filter, search);
        assert_eq!(listing.sweets.len(), 1);
        assert_eq!(listing.sweets[0].name, "Gummy Bear");
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_mutation_still_refreshes() -> Result<()> {
        let (shop, sweet_id) = setup_storefront().await?;
        shop.browse(SweetFilter::default()).await?;
        create_test_sweet(shop.database(), "Gummy Bear", "Gummies", 0.25, 50).await?;

        let outcome = shop.purchase(sweet_id, 99, "user1").await;
        assert!(!outcome.success);
        assert_eq!(shop.cache().sweets().await.len(), 2);
        assert!(shop.cache().categories().await.contains(&"Gummies".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_browse_rejects_bad_filter_without_replacing_it() -> Result<()> {
        let (shop, _) = setup_storefront().await?;
        let result = shop
            .browse(SweetFilter {
                max_price: Some(f64::INFINITY),
                ..Default::default()
            })
            .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        assert_eq!(shop.cache().active_filter().await, SweetFilter::default());
        Ok(())
    }
}
