//! Catalog-wide statistics for the dashboard.
//!
//! Every statistic is an independent read against the store. Values in one snapshot are not
//! guaranteed to be mutually consistent when writes race with the dashboard request.

use crate::domain::product::Product;
use crate::domain::query::{SortDirection, SortSpec};
use crate::storage::{ProductStore, StoreError};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSnapshot {
    pub total_count: i64,
    #[schema(value_type = String)]
    pub total_value: Decimal,
    #[schema(value_type = String)]
    pub average_price: Decimal,
    /// Ordered the way the store enumerates categories.
    pub category_counts: Vec<CategoryCount>,
    pub low_stock_threshold: i32,
    pub low_stock_items: Vec<Product>,
    pub recent_items: Vec<Product>,
}

/// Read-only statistics over the whole product collection.
#[derive(Clone)]
pub struct AggregationEngine {
    store: Arc<dyn ProductStore>,
}

impl AggregationEngine {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn total_count(&self) -> Result<i64, StoreError> {
        self.store.count().await
    }

    /// Zero, not `None`, for an empty catalog.
    pub async fn total_value(&self) -> Result<Decimal, StoreError> {
        Ok(self.store.sum_price().await?.unwrap_or(Decimal::ZERO))
    }

    /// Zero, not `None`, for an empty catalog.
    pub async fn average_price(&self) -> Result<Decimal, StoreError> {
        Ok(self.store.avg_price().await?.unwrap_or(Decimal::ZERO))
    }

    /// One count query per category.
    pub async fn category_counts(&self) -> Result<Vec<CategoryCount>, StoreError> {
        let categories = self.store.find_all_categories().await?;
        let mut counts = Vec::with_capacity(categories.len());
        for category in categories {
            let count = self.store.count_by_category(&category).await?;
            counts.push(CategoryCount { category, count });
        }
        Ok(counts)
    }

    /// Products with `quantity` strictly below `threshold`.
    pub async fn low_stock(&self, threshold: i32) -> Result<Vec<Product>, StoreError> {
        self.store.find_where_quantity_less_than(threshold).await
    }

    /// The `limit` newest products, newest first. Returns everything when fewer exist.
    pub async fn recent(&self, limit: usize) -> Result<Vec<Product>, StoreError> {
        let newest_first = SortSpec::new("createdAt", SortDirection::Desc);
        let mut products = self.store.find_all(Some(&newest_first)).await?;
        products.truncate(limit);
        Ok(products)
    }

    pub async fn snapshot(
        &self,
        low_stock_threshold: i32,
        recent_limit: usize,
    ) -> Result<AggregateSnapshot, StoreError> {
        let (total_count, total_value, average_price, category_counts, low_stock_items, recent_items) = tokio::try_join!(
            self.total_count(),
            self.total_value(),
            self.average_price(),
            self.category_counts(),
            self.low_stock(low_stock_threshold),
            self.recent(recent_limit),
        )?;
        debug!(
            total_count,
            categories = category_counts.len(),
            low_stock = low_stock_items.len(),
            "computed dashboard snapshot"
        );
        Ok(AggregateSnapshot {
            total_count,
            total_value,
            average_price,
            category_counts,
            low_stock_threshold,
            low_stock_items,
            recent_items,
        })
    }
}
