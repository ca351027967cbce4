//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! The listing query fetches the page and the total record count in one
//! pass using `COUNT(*) OVER()`, so pagination metadata never drifts from
//! the returned rows.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vendo_core::{Metadata, Product, ProductFilters};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    cost: i64,
    amount_available: i64,
    seller_id: i64,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            cost: row.cost,
            amount_available: row.amount_available,
            seller_id: row.seller_id,
            created_at: row.created_at,
        }
    }
}

/// Listing row carrying the window-function total alongside the product.
#[derive(Debug, sqlx::FromRow)]
struct CountedProductRow {
    total_records: i64,
    id: i64,
    name: String,
    cost: i64,
    amount_available: i64,
    seller_id: i64,
    created_at: DateTime<Utc>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product for its seller.
    ///
    /// ## Returns
    /// * `Ok(Product)` - stored record with generated id and timestamp
    /// * `Err(DbError::UniqueViolation)` - this seller already has a
    ///   product with the same name
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(name = %product.name, seller_id = product.seller_id, "Inserting product");

        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, cost, amount_available, seller_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&product.name)
        .bind(product.cost)
        .bind(product.amount_available)
        .bind(product.seller_id)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: product.name.clone(),
            cost: product.cost,
            amount_available: product.amount_available,
            seller_id: product.seller_id,
            created_at,
        })
    }

    /// Gets a product by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, cost, amount_available, seller_id, created_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Lists a catalog page in insertion order, with pagination metadata.
    pub async fn list(&self, filters: &ProductFilters) -> DbResult<(Vec<Product>, Metadata)> {
        let rows: Vec<CountedProductRow> = sqlx::query_as(
            r#"
            SELECT COUNT(*) OVER() AS total_records,
                   id, name, cost, amount_available, seller_id, created_at
            FROM products
            ORDER BY id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(filters.limit())
        .bind(filters.offset())
        .fetch_all(&self.pool)
        .await?;

        let total_records = rows.first().map_or(0, |row| row.total_records);
        let metadata = Metadata::new(total_records, filters.page, filters.page_size);

        let products = rows
            .into_iter()
            .map(|row| Product {
                id: row.id,
                name: row.name,
                cost: row.cost,
                amount_available: row.amount_available,
                seller_id: row.seller_id,
                created_at: row.created_at,
            })
            .collect();

        Ok((products, metadata))
    }

    /// Persists the mutable fields of a product record.
    ///
    /// The owning seller never changes; ownership is checked by the service
    /// layer before this is called.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?1, cost = ?2, amount_available = ?3
            WHERE id = ?4
            "#,
        )
        .bind(&product.name)
        .bind(product.cost)
        .bind(product.amount_available)
        .bind(product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("product", product.id));
        }

        Ok(())
    }

    /// Deletes a product.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use vendo_core::{Product, ProductFilters, Role};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn draft(name: &str, seller_id: i64) -> Product {
        Product {
            id: 0,
            name: name.to_string(),
            cost: 100,
            amount_available: 20,
            seller_id,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_get_update_delete() {
        let db = test_db().await;
        let seller = db.users().insert("s1", Role::Seller, "hash").await.unwrap();
        let repo = db.products();

        let mut product = repo.insert(&draft("Lemonade", seller.id)).await.unwrap();
        assert!(product.id > 0);

        let found = repo.get(product.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Lemonade");
        assert_eq!(found.amount_available, 20);

        product.cost = 150;
        product.amount_available = 18;
        repo.update(&product).await.unwrap();
        let found = repo.get(product.id).await.unwrap().unwrap();
        assert_eq!(found.cost, 150);
        assert_eq!(found.amount_available, 18);

        repo.delete(product.id).await.unwrap();
        assert!(repo.get(product.id).await.unwrap().is_none());
        assert!(repo.delete(product.id).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_name_per_seller_only() {
        let db = test_db().await;
        let s1 = db.users().insert("s1", Role::Seller, "hash").await.unwrap();
        let s2 = db.users().insert("s2", Role::Seller, "hash").await.unwrap();
        let repo = db.products();

        repo.insert(&draft("Lemonade", s1.id)).await.unwrap();

        let err = repo.insert(&draft("Lemonade", s1.id)).await.unwrap_err();
        assert!(err.violates_unique("products.name"), "got: {err}");

        // Same name under a different seller is fine.
        repo.insert(&draft("Lemonade", s2.id)).await.unwrap();
    }

    #[tokio::test]
    async fn listing_paginates_with_totals() {
        let db = test_db().await;
        let seller = db.users().insert("s1", Role::Seller, "hash").await.unwrap();
        let repo = db.products();

        for i in 0..5 {
            repo.insert(&draft(&format!("product-{i}"), seller.id))
                .await
                .unwrap();
        }

        let (page, metadata) = repo
            .list(&ProductFilters { page: 2, page_size: 2 })
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "product-2");
        assert_eq!(metadata.total_records, 5);
        assert_eq!(metadata.last_page, 3);
        assert_eq!(metadata.current_page, 2);

        let (empty, metadata) = repo
            .list(&ProductFilters { page: 9, page_size: 2 })
            .await
            .unwrap();
        assert!(empty.is_empty());
        assert_eq!(metadata.total_records, 0);
    }
}
