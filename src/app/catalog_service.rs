//! The catalog service.
//!
//! Sits between the HTTP handlers and the product store:
//! 1.  Runs composed listing/search queries against the store.
//! 2.  Turns lookups of missing products into `None`.
//! 3.  Turns failed saves/deletes into user-facing messages instead of errors.
//! 4.  Builds the dashboard snapshot.

use crate::domain::product::Product;
use crate::domain::query::{
    compose_listing, compose_search, ListingParams, ListingQuery, QueryDescriptor, SearchParams,
    SearchQuery,
};
use crate::domain::stats::{AggregateSnapshot, AggregationEngine};
use crate::error::CatalogResult;
use crate::storage::{ProductStore, ResultSet};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;

/// Dashboard knobs, normally read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub low_stock_threshold: i32,
    pub recent_limit: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            low_stock_threshold: 10,
            recent_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    #[schema(value_type = Object)]
    pub products: ResultSet<Product>,
    /// Every category in use, for the filter selector.
    pub categories: Vec<String>,
    pub filters: QueryDescriptor,
    /// The direction token exactly as requested.
    pub sort_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Keyword,
    Advanced,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchView {
    pub mode: SearchMode,
    #[schema(value_type = Object)]
    pub products: ResultSet<Product>,
    pub filters: QueryDescriptor,
    pub current_page: usize,
    pub total_pages: u64,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Results(SearchView),
    /// No usable criteria: show the plain listing instead.
    RedirectToListing,
}

/// Result of a write. Failures carry a message for the user rather than an error value.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Saved { product: Product, message: String },
    Deleted { message: String },
    Failed { message: String },
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, MutationOutcome::Failed { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            MutationOutcome::Saved { message, .. }
            | MutationOutcome::Deleted { message }
            | MutationOutcome::Failed { message } => message,
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    stats: AggregationEngine,
    settings: DashboardSettings,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ProductStore>, settings: DashboardSettings) -> Self {
        let stats = AggregationEngine::new(store.clone());
        Self {
            store,
            stats,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    pub fn settings(&self) -> DashboardSettings {
        self.settings
    }

    pub async fn list(&self, params: &ListingParams) -> CatalogResult<ListingView> {
        let query = compose_listing(params);
        debug!(?query, "dispatching listing query");

        let products = match &query {
            ListingQuery::All => self.store.find_all(None).await?,
            ListingQuery::Sorted(sort) => self.store.find_all(Some(sort)).await?,
            ListingQuery::ByCategory(category) => self.store.find_by_category(category, None).await?,
            ListingQuery::ByCategorySorted { category, sort } => {
                self.store.find_by_category(category, Some(sort)).await?
            }
        };
        let categories = self.store.find_all_categories().await?;

        Ok(ListingView {
            products: products.into(),
            categories,
            filters: query.describe(),
            sort_dir: params.sort_dir.clone(),
        })
    }

    pub async fn search(&self, params: &SearchParams) -> CatalogResult<SearchOutcome> {
        let query = compose_search(params);
        debug!(?query, "dispatching search query");

        let (mode, page) = match &query {
            SearchQuery::Keyword { keyword, page } => (
                SearchMode::Keyword,
                self.store.find_by_name_containing(keyword, *page).await?,
            ),
            SearchQuery::Advanced { criteria, page } => (
                SearchMode::Advanced,
                self.store.advanced_search(criteria, *page).await?,
            ),
            SearchQuery::RedirectToListing => return Ok(SearchOutcome::RedirectToListing),
        };

        Ok(SearchOutcome::Results(SearchView {
            mode,
            current_page: params.page,
            total_pages: page.total_pages,
            size: params.size,
            filters: query.describe(),
            products: page.into(),
        }))
    }

    /// `Ok(None)` when no product has this id.
    pub async fn get(&self, id: i64) -> CatalogResult<Option<Product>> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn save(&self, product: Product) -> MutationOutcome {
        let is_new = product.id.is_none();
        match self.store.save(product).await {
            Ok(saved) => {
                info!(id = ?saved.id, is_new, "product saved");
                let message = if is_new { "Product added!" } else { "Product updated!" };
                MutationOutcome::Saved {
                    product: saved,
                    message: message.to_string(),
                }
            }
            Err(e) => {
                warn!(error = %e, is_new, "failed to save product");
                MutationOutcome::Failed {
                    message: format!("Error: {}", e),
                }
            }
        }
    }

    pub async fn delete(&self, id: i64) -> MutationOutcome {
        match self.store.delete_by_id(id).await {
            Ok(()) => {
                info!(id, "product deleted");
                MutationOutcome::Deleted {
                    message: "Product deleted!".to_string(),
                }
            }
            Err(e) => {
                error!(id, error = %e, "failed to delete product");
                MutationOutcome::Failed {
                    message: "Error deleting product.".to_string(),
                }
            }
        }
    }

    pub async fn dashboard(&self) -> CatalogResult<AggregateSnapshot> {
        let snapshot = self
            .stats
            .snapshot(self.settings.low_stock_threshold, self.settings.recent_limit)
            .await?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{AdvancedCriteria, PageRequest, SortSpec};
    use crate::storage::{InMemoryProductStore, Page, StoreError};
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    fn product(name: &str, category: &str, price: i64, quantity: i32) -> Product {
        Product::new(name, category, Decimal::from(price), quantity)
    }

    async fn service() -> CatalogService {
        let store = InMemoryProductStore::with_products(vec![
            product("Kettle", "Kitchen", 30, 6),
            product("Toaster", "Kitchen", 45, 20),
            product("Chisel", "Tools", 12, 3),
        ])
        .await;
        CatalogService::new(Arc::new(store), DashboardSettings::default())
    }

    fn names(set: &ResultSet<Product>) -> Vec<&str> {
        set.content.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn listing_filters_sorts_and_echoes() {
        let svc = service().await;
        let view = svc
            .list(&ListingParams {
                sort_by: Some("price".to_string()),
                sort_dir: "desc".to_string(),
                category: Some("Kitchen".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(names(&view.products), vec!["Toaster", "Kettle"]);
        assert_eq!(view.products.paging, None);
        assert_eq!(view.categories, vec!["Kitchen", "Tools"]);
        assert_eq!(view.filters.category.as_deref(), Some("Kitchen"));
        assert_eq!(view.sort_dir, "desc");
    }

    #[tokio::test]
    async fn listing_with_unknown_sort_field_fails() {
        let svc = service().await;
        let result = svc
            .list(&ListingParams {
                sort_by: Some("colour".to_string()),
                ..Default::default()
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn search_without_criteria_redirects() {
        let svc = service().await;
        let outcome = svc.search(&SearchParams::default()).await.unwrap();
        assert!(matches!(outcome, SearchOutcome::RedirectToListing));
    }

    #[tokio::test]
    async fn keyword_search_ignores_advanced_fields() {
        let svc = service().await;
        let outcome = svc
            .search(&SearchParams {
                keyword: Some("kett".to_string()),
                category: Some("Tools".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let SearchOutcome::Results(view) = outcome else {
            panic!("expected results");
        };
        assert_eq!(view.mode, SearchMode::Keyword);
        assert_eq!(names(&view.products), vec!["Kettle"]);
        assert_eq!(view.total_pages, 1);
    }

    #[tokio::test]
    async fn advanced_search_pages_results() {
        let svc = service().await;
        let outcome = svc
            .search(&SearchParams {
                min_price: Some(Decimal::from(10)),
                page: 1,
                size: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        let SearchOutcome::Results(view) = outcome else {
            panic!("expected results");
        };
        assert_eq!(view.mode, SearchMode::Advanced);
        assert_eq!(names(&view.products), vec!["Chisel"]);
        assert_eq!((view.current_page, view.total_pages, view.size), (1, 2, 2));
    }

    #[tokio::test]
    async fn save_reports_added_then_updated() {
        let svc = service().await;
        let outcome = svc.save(product("Whisk", "Kitchen", 4, 50)).await;
        let MutationOutcome::Saved { product: mut saved, message } = outcome else {
            panic!("expected save");
        };
        assert_eq!(message, "Product added!");
        assert_eq!(saved.id, Some(4));

        saved.quantity = 49;
        let outcome = svc.save(saved).await;
        assert_eq!(outcome.message(), "Product updated!");
        assert_eq!(svc.get(4).await.unwrap().unwrap().quantity, 49);
    }

    #[tokio::test]
    async fn save_failure_becomes_message() {
        let svc = service().await;
        let mut ghost = product("Ghost", "Kitchen", 1, 1);
        ghost.id = Some(77);
        let outcome = svc.save(ghost).await;
        assert!(!outcome.is_success());
        assert!(outcome.message().starts_with("Error: "));
    }

    #[tokio::test]
    async fn missing_product_is_none_and_delete_of_missing_succeeds() {
        let svc = service().await;
        assert!(svc.get(404).await.unwrap().is_none());
        let outcome = svc.delete(404).await;
        assert_eq!(
            outcome,
            MutationOutcome::Deleted {
                message: "Product deleted!".to_string()
            }
        );
    }

    struct BrokenStore;

    #[async_trait]
    impl ProductStore for BrokenStore {
        async fn find_all(&self, _: Option<&SortSpec>) -> Result<Vec<Product>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_by_id(&self, _: i64) -> Result<Option<Product>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn save(&self, _: Product) -> Result<Product, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn delete_by_id(&self, _: i64) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_by_category(
            &self,
            _: &str,
            _: Option<&SortSpec>,
        ) -> Result<Vec<Product>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_all_categories(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_by_name_containing(
            &self,
            _: &str,
            _: PageRequest,
        ) -> Result<Page<Product>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn advanced_search(
            &self,
            _: &AdvancedCriteria,
            _: PageRequest,
        ) -> Result<Page<Product>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn count_by_category(&self, _: &str) -> Result<i64, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn sum_price(&self) -> Result<Option<Decimal>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn avg_price(&self) -> Result<Option<Decimal>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_where_quantity_less_than(
            &self,
            _: i32,
        ) -> Result<Vec<Product>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn count(&self) -> Result<i64, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn persistence_failures_never_escape_mutations() {
        let svc = CatalogService::new(Arc::new(BrokenStore), DashboardSettings::default());
        let saved = svc.save(product("X", "Y", 1, 1)).await;
        assert!(matches!(saved, MutationOutcome::Failed { .. }));
        assert_eq!(
            svc.delete(1).await,
            MutationOutcome::Failed {
                message: "Error deleting product.".to_string()
            }
        );
        assert!(svc.dashboard().await.is_err());
        assert!(svc.get(1).await.is_err());
    }
}
