//! Process-local product store.
//!
//! Backs the test suites and the `performance_test` binary. Behaves like the Postgres store for
//! every query the catalog issues.

use crate::domain::product::Product;
use crate::domain::query::{AdvancedCriteria, PageRequest, SortDirection, SortSpec};
use crate::storage::{check_page_request, Page, ProductStore, SortField, StoreError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, Product>,
}

#[derive(Default)]
pub struct InMemoryProductStore {
    inner: RwLock<Inner>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated through `save`, so ids are assigned in input order.
    pub async fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write().await;
            for product in products {
                inner.insert(product);
            }
        }
        store
    }

    async fn filtered<F>(&self, keep: F) -> Vec<Product>
    where
        F: Fn(&Product) -> bool,
    {
        let inner = self.inner.read().await;
        inner.rows.values().filter(|p| keep(p)).cloned().collect()
    }
}

impl Inner {
    fn insert(&mut self, mut product: Product) -> Product {
        self.next_id += 1;
        product.id = Some(self.next_id);
        self.rows.insert(self.next_id, product.clone());
        product
    }
}

fn compare(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Category => a.category.cmp(&b.category),
        SortField::Price => a.price.cmp(&b.price),
        SortField::Quantity => a.quantity.cmp(&b.quantity),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Stable sort, so ties keep `id` order in both directions.
fn apply_sort(mut rows: Vec<Product>, sort: Option<&SortSpec>) -> Result<Vec<Product>, StoreError> {
    if let Some(sort) = sort {
        let field = SortField::parse(&sort.field)?;
        match sort.direction {
            SortDirection::Asc => rows.sort_by(|a, b| compare(a, b, field)),
            SortDirection::Desc => rows.sort_by(|a, b| compare(b, a, field)),
        }
    }
    Ok(rows)
}

fn paginate(rows: Vec<Product>, page: PageRequest) -> Page<Product> {
    let total = rows.len() as u64;
    let content = rows
        .into_iter()
        .skip(page.offset())
        .take(page.size)
        .collect();
    Page::new(content, page, total)
}

fn name_contains(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_criteria(product: &Product, criteria: &AdvancedCriteria) -> bool {
    criteria
        .name_constraint()
        .map_or(true, |n| name_contains(&product.name, n))
        && criteria
            .category_constraint()
            .map_or(true, |c| product.category == c)
        && criteria.min_price.map_or(true, |min| product.price >= min)
        && criteria.max_price.map_or(true, |max| product.price <= max)
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn find_all(&self, sort: Option<&SortSpec>) -> Result<Vec<Product>, StoreError> {
        apply_sort(self.filtered(|_| true).await, sort)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn save(&self, mut product: Product) -> Result<Product, StoreError> {
        let mut inner = self.inner.write().await;
        match product.id {
            None => Ok(inner.insert(product)),
            Some(id) => {
                let existing = inner
                    .rows
                    .get_mut(&id)
                    .ok_or(StoreError::ProductNotFound(id))?;
                product.created_at = existing.created_at;
                *existing = product.clone();
                Ok(product)
            }
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.inner.write().await.rows.remove(&id);
        Ok(())
    }

    async fn find_by_category(
        &self,
        category: &str,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Product>, StoreError> {
        apply_sort(self.filtered(|p| p.category == category).await, sort)
    }

    async fn find_all_categories(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        let distinct: BTreeSet<&String> = inner.rows.values().map(|p| &p.category).collect();
        Ok(distinct.into_iter().cloned().collect())
    }

    async fn find_by_name_containing(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        check_page_request(page)?;
        let rows = self.filtered(|p| name_contains(&p.name, keyword)).await;
        Ok(paginate(rows, page))
    }

    async fn advanced_search(
        &self,
        criteria: &AdvancedCriteria,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        check_page_request(page)?;
        let rows = self.filtered(|p| matches_criteria(p, criteria)).await;
        Ok(paginate(rows, page))
    }

    async fn count_by_category(&self, category: &str) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.values().filter(|p| p.category == category).count() as i64)
    }

    async fn sum_price(&self) -> Result<Option<Decimal>, StoreError> {
        let inner = self.inner.read().await;
        if inner.rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(inner.rows.values().map(|p| p.price).sum()))
    }

    async fn avg_price(&self) -> Result<Option<Decimal>, StoreError> {
        let inner = self.inner.read().await;
        if inner.rows.is_empty() {
            return Ok(None);
        }
        let sum: Decimal = inner.rows.values().map(|p| p.price).sum();
        Ok(Some(sum / Decimal::from(inner.rows.len() as u64)))
    }

    async fn find_where_quantity_less_than(
        &self,
        threshold: i32,
    ) -> Result<Vec<Product>, StoreError> {
        Ok(self.filtered(|p| p.quantity < threshold).await)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.inner.read().await.rows.len() as i64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
