//! Product store backed by PostgreSQL.

use crate::domain::product::Product;
use crate::domain::query::{AdvancedCriteria, PageRequest, SortSpec};
use crate::storage::{check_page_request, Page, ProductStore, SortField, StoreError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::info;

const SELECT_COLUMNS: &str = "SELECT id, name, category, price, quantity, created_at FROM products";

/// A product store that uses a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and makes sure the `products` table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS products (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                price NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
                quantity INTEGER NOT NULL CHECK (quantity >= 0),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS products_category_idx ON products (category)")
            .execute(&self.pool)
            .await?;

        info!("products schema ready");
        Ok(())
    }

    async fn fetch_sorted(
        &self,
        category: Option<&str>,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Product>, StoreError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_COLUMNS);
        if let Some(category) = category {
            qb.push(" WHERE category = ").push_bind(category);
        }
        push_order_by(&mut qb, sort)?;

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn fetch_page<F>(&self, page: PageRequest, push_where: F) -> Result<Page<Product>, StoreError>
    where
        F: Fn(&mut QueryBuilder<'_, Postgres>),
    {
        check_page_request(page)?;

        let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM products");
        push_where(&mut count_qb);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_COLUMNS);
        push_where(&mut qb);
        qb.push(" ORDER BY id ASC LIMIT ")
            .push_bind(to_i64(page.size))
            .push(" OFFSET ")
            .push_bind(to_i64(page.offset()));

        let rows = qb.build().fetch_all(&self.pool).await?;
        let content = rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(content, page, total.max(0) as u64))
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn row_to_product(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: Some(row.try_get("id")?),
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        price: row.try_get("price")?,
        quantity: row.try_get("quantity")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Sort columns come from the `SortField` whitelist; user text never reaches the SQL.
fn push_order_by(qb: &mut QueryBuilder<'_, Postgres>, sort: Option<&SortSpec>) -> Result<(), StoreError> {
    match sort {
        Some(sort) => {
            let field = SortField::parse(&sort.field)?;
            qb.push(" ORDER BY ")
                .push(field.column())
                .push(" ")
                .push(sort.direction.as_sql())
                .push(", id ASC");
        }
        None => {
            qb.push(" ORDER BY id ASC");
        }
    }
    Ok(())
}

/// `%`/`_` in user input are matched literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_criteria(qb: &mut QueryBuilder<'_, Postgres>, criteria: &AdvancedCriteria) {
    let mut sep = " WHERE ";
    if let Some(name) = criteria.name_constraint() {
        qb.push(sep).push("name ILIKE ").push_bind(like_pattern(name));
        sep = " AND ";
    }
    if let Some(category) = criteria.category_constraint() {
        qb.push(sep).push("category = ").push_bind(category.to_string());
        sep = " AND ";
    }
    if let Some(min) = criteria.min_price {
        qb.push(sep).push("price >= ").push_bind(min);
        sep = " AND ";
    }
    if let Some(max) = criteria.max_price {
        qb.push(sep).push("price <= ").push_bind(max);
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find_all(&self, sort: Option<&SortSpec>) -> Result<Vec<Product>, StoreError> {
        self.fetch_sorted(None, sort).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_product).transpose()
    }

    async fn save(&self, product: Product) -> Result<Product, StoreError> {
        let row = match product.id {
            None => {
                sqlx::query(
                    "INSERT INTO products (name, category, price, quantity, created_at)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING id, name, category, price, quantity, created_at",
                )
                .bind(&product.name)
                .bind(&product.category)
                .bind(product.price)
                .bind(product.quantity)
                .bind(product.created_at)
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => sqlx::query(
                "UPDATE products SET name = $1, category = $2, price = $3, quantity = $4
                 WHERE id = $5
                 RETURNING id, name, category, price, quantity, created_at",
            )
            .bind(&product.name)
            .bind(&product.category)
            .bind(product.price)
            .bind(product.quantity)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::ProductNotFound(id))?,
        };
        row_to_product(&row)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_category(
        &self,
        category: &str,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Product>, StoreError> {
        self.fetch_sorted(Some(category), sort).await
    }

    async fn find_all_categories(&self) -> Result<Vec<String>, StoreError> {
        let categories = sqlx::query_scalar("SELECT DISTINCT category FROM products ORDER BY category")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn find_by_name_containing(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        let pattern = like_pattern(keyword);
        self.fetch_page(page, |qb| {
            qb.push(" WHERE name ILIKE ").push_bind(pattern.clone());
        })
        .await
    }

    async fn advanced_search(
        &self,
        criteria: &AdvancedCriteria,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        self.fetch_page(page, |qb| push_criteria(qb, criteria)).await
    }

    async fn count_by_category(&self, category: &str) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category = $1")
            .bind(category)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn sum_price(&self) -> Result<Option<Decimal>, StoreError> {
        let sum = sqlx::query_scalar("SELECT SUM(price) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(sum)
    }

    async fn avg_price(&self) -> Result<Option<Decimal>, StoreError> {
        let avg = sqlx::query_scalar("SELECT AVG(price) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(avg)
    }

    async fn find_where_quantity_less_than(
        &self,
        threshold: i32,
    ) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!("{} WHERE quantity < $1 ORDER BY id ASC", SELECT_COLUMNS))
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
