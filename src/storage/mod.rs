//! Storage collaborator: the contract the catalog core reads and writes through.

use crate::domain::product::Product;
use crate::domain::query::{AdvancedCriteria, PageRequest, SortSpec};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

pub mod in_memory;
pub mod page;
pub mod postgres;

pub use in_memory::InMemoryProductStore;
pub use page::{Page, PageInfo, ResultSet};
pub use postgres::PgProductStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No property '{0}' found for type 'Product'")]
    InvalidSortField(String),

    #[error("Page size must not be less than one (got {size})")]
    InvalidPageRequest { size: usize },

    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
}

/// Sortable product properties, keyed by their external name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Category,
    Price,
    Quantity,
    CreatedAt,
}

impl SortField {
    pub fn parse(field: &str) -> Result<Self, StoreError> {
        match field {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "category" => Ok(SortField::Category),
            "price" => Ok(SortField::Price),
            "quantity" => Ok(SortField::Quantity),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            other => Err(StoreError::InvalidSortField(other.to_string())),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Category => "category",
            SortField::Price => "price",
            SortField::Quantity => "quantity",
            SortField::CreatedAt => "created_at",
        }
    }
}

pub(crate) fn check_page_request(page: PageRequest) -> Result<(), StoreError> {
    if page.size == 0 {
        return Err(StoreError::InvalidPageRequest { size: page.size });
    }
    Ok(())
}

/// Everything the catalog needs from a product store.
///
/// Implementations own consistency: the core adds no locking of its own and issues each call
/// as an independent read or write.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, in `id` order unless a sort is given.
    async fn find_all(&self, sort: Option<&SortSpec>) -> Result<Vec<Product>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Inserts when `id` is `None`, otherwise overwrites the stored row (keeping `created_at`).
    async fn save(&self, product: Product) -> Result<Product, StoreError>;

    /// Deleting an unknown id is not an error.
    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError>;

    async fn find_by_category(
        &self,
        category: &str,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Product>, StoreError>;

    /// Distinct categories currently in use, ascending.
    async fn find_all_categories(&self) -> Result<Vec<String>, StoreError>;

    /// Case-insensitive substring match on `name`.
    async fn find_by_name_containing(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError>;

    async fn advanced_search(
        &self,
        criteria: &AdvancedCriteria,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError>;

    async fn count_by_category(&self, category: &str) -> Result<i64, StoreError>;

    /// `None` when there are no rows.
    async fn sum_price(&self) -> Result<Option<Decimal>, StoreError>;

    /// `None` when there are no rows.
    async fn avg_price(&self) -> Result<Option<Decimal>, StoreError>;

    async fn find_where_quantity_less_than(
        &self,
        threshold: i32,
    ) -> Result<Vec<Product>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
