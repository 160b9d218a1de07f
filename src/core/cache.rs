//! Inventory cache - The storefront's last fetched listing and category set.
//!
//! The cache is always replaced wholesale, never patched. Every refresh takes a ticket
//! carrying a monotonically increasing token and the filter active at that moment.
//! When a refresh finishes, its result is only applied if no later ticket has already
//! been applied, so overlapping refreshes can never move the cache back in time.

use crate::{
    core::{
        filter::{SweetFilter, fetch_sweets},
        sweet::list_categories,
    },
    entities::sweet,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, trace};

/// A consistent view of the cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSnapshot {
    /// Listing for `filter`, ordered by name
    pub sweets: Vec<sweet::Model>,
    /// Every category in the catalog, independent of `filter`
    pub categories: Vec<String>,
    /// Filter the listing was fetched with
    pub filter: SweetFilter,
    /// Token of the refresh that produced this snapshot; 0 before the first refresh
    pub token: u64,
}

/// Handle for one in-flight refresh.
#[derive(Debug, Clone)]
pub struct RefreshTicket {
    /// Position of this refresh in issue order
    pub token: u64,
    /// Filter to fetch the listing with
    pub filter: SweetFilter,
}

/// What happened to a finished refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The result replaced the cache contents
    Applied {
        /// Token of the applied refresh
        token: u64,
    },
    /// A newer refresh had already landed, the result was dropped
    Discarded {
        /// Token of the dropped refresh
        token: u64,
        /// Token currently in the cache
        current: u64,
    },
}

/// Cached listing and categories with refresh fencing.
#[derive(Debug, Default)]
pub struct InventoryCache {
    state: RwLock<CacheSnapshot>,
    active_filter: RwLock<SweetFilter>,
    last_issued: AtomicU64,
}

impl InventoryCache {
    /// Creates an empty cache with the unconstrained filter active.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clones the current contents.
    pub async fn snapshot(&self) -> CacheSnapshot {
        self.state.read().await.clone()
    }

    /// Cached listing.
    pub async fn sweets(&self) -> Vec<sweet::Model> {
        self.state.read().await.sweets.clone()
    }

    /// Cached category set.
    pub async fn categories(&self) -> Vec<String> {
        self.state.read().await.categories.clone()
    }

    /// Filter that the next refresh will use.
    pub async fn active_filter(&self) -> SweetFilter {
        self.active_filter.read().await.clone()
    }

    /// Replaces the active filter. Takes effect on the next refresh.
    pub async fn set_filter(&self, filter: SweetFilter) {
        *self.active_filter.write().await = filter;
    }

    /// Starts a refresh: issues the next token together with the active filter.
    pub async fn begin_refresh(&self) -> RefreshTicket {
        // Hold the filter lock while issuing so tokens and filters are ordered together
        let filter = self.active_filter.read().await;
        let token = self.last_issued.fetch_add(1, Ordering::SeqCst) + 1;
        RefreshTicket {
            token,
            filter: filter.clone(),
        }
    }

    /// Finishes a refresh, applying its result unless a newer one already landed.
    pub async fn complete_refresh(
        &self,
        ticket: RefreshTicket,
        sweets: Vec<sweet::Model>,
        categories: Vec<String>,
    ) -> RefreshOutcome {
        let mut state = self.state.write().await;
        if ticket.token <= state.token {
            debug!(
                "Discarding stale refresh {} (cache is at {})",
                ticket.token, state.token
            );
            return RefreshOutcome::Discarded {
                token: ticket.token,
                current: state.token,
            };
        }

        *state = CacheSnapshot {
            sweets,
            categories,
            filter: ticket.filter,
            token: ticket.token,
        };
        info!(
            "Inventory cache refreshed with {} sweets and {} categories.",
            state.sweets.len(),
            state.categories.len()
        );
        trace!("Inventory cache now contains: {:?}", state.sweets);
        RefreshOutcome::Applied {
            token: ticket.token,
        }
    }

    /// Refetches the listing (with the active filter) and the category set.
    ///
    /// On error the cache keeps its previous contents.
    #[instrument(skip(self, db))]
    pub async fn refresh(&self, db: &DatabaseConnection) -> Result<RefreshOutcome> {
        let ticket = self.begin_refresh().await;
        let sweets = fetch_sweets(db, &ticket.filter).await?;
        let categories = list_categories(db).await?;
        Ok(self.complete_refresh(ticket, sweets, categories).await)
    }
}
