//! Listing filters - Turns a customer's filter form into a catalog query.
//!
//! A [`SweetFilter`] is never stored. It is built from whatever the customer typed,
//! checked with [`SweetFilter::validate`], and then either compiled into a SQL
//! [`Condition`] for the store or evaluated in memory with [`SweetFilter::matches`].
//! Both paths apply the same rules; every active constraint is ANDed together.

use crate::{
    entities::{Sweet, sweet},
    errors::{Error, Result},
};
use sea_orm::{
    Condition, QueryOrder, Select,
    prelude::*,
    sea_query::{Expr, Func, LikeExpr},
};
use tracing::{debug, instrument};

/// Category value meaning "no category constraint".
pub const ALL_CATEGORIES: &str = "all";

/// Filter applied to the sweets listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SweetFilter {
    /// Substring of the name, ASCII case-insensitive; empty means no constraint
    pub search: String,
    /// Exact category, or [`ALL_CATEGORIES`]
    pub category: String,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
}

impl Default for SweetFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            min_price: None,
            max_price: None,
        }
    }
}

/// Case folding shared by the store and in-memory paths. `SQLite`'s `LOWER` only
/// folds ASCII, so anything wider would make the two disagree.
fn fold_case(text: &str) -> String {
    text.to_ascii_lowercase()
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl SweetFilter {
    fn category_constraint(&self) -> Option<&str> {
        (self.category != ALL_CATEGORIES).then_some(self.category.as_str())
    }

    /// Rejects malformed price bounds.
    ///
    /// `min_price > max_price` is not an error; it simply matches nothing.
    pub fn validate(&self) -> Result<()> {
        for (label, bound) in [("Minimum", self.min_price), ("Maximum", self.max_price)] {
            if let Some(bound) = bound {
                if !bound.is_finite() || bound < 0.0 {
                    return Err(Error::validation(format!(
                        "{label} price must be a non-negative number"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Compiles the filter into a store-side condition.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if !self.search.is_empty() {
            let pattern = format!("%{}%", escape_like(&fold_case(&self.search)));
            condition = condition.add(
                Expr::expr(Func::lower(Expr::col(sweet::Column::Name)))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        if let Some(category) = self.category_constraint() {
            condition = condition.add(sweet::Column::Category.eq(category));
        }
        if let Some(min_price) = self.min_price {
            condition = condition.add(sweet::Column::Price.gte(min_price));
        }
        if let Some(max_price) = self.max_price {
            condition = condition.add(sweet::Column::Price.lte(max_price));
        }

        condition
    }

    /// Full listing query: filter plus name ordering, ties broken by id.
    #[must_use]
    pub fn query(&self) -> Select<Sweet> {
        Sweet::find()
            .filter(self.condition())
            .order_by_asc(sweet::Column::Name)
            .order_by_asc(sweet::Column::Id)
    }

    /// Evaluates the filter against a single sweet in memory.
    #[must_use]
    pub fn matches(&self, sweet: &sweet::Model) -> bool {
        if !self.search.is_empty() && !fold_case(&sweet.name).contains(&fold_case(&self.search)) {
            return false;
        }
        if self
            .category_constraint()
            .is_some_and(|category| sweet.category != category)
        {
            return false;
        }
        if self.min_price.is_some_and(|min| sweet.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| sweet.price > max) {
            return false;
        }
        true
    }
}

/// Fetches the sweets matching `filter`, ordered by name.
///
/// # Errors
/// Returns a validation error for malformed bounds before querying, or a database
/// error if the query fails.
#[instrument(skip(db))]
pub async fn fetch_sweets(db: &DatabaseConnection, filter: &SweetFilter) -> Result<Vec<sweet::Model>> {
    filter.validate()?;
    let sweets = filter.query().all(db).await?;
    debug!("Filter matched {} sweets", sweets.len());
    Ok(sweets)
}
