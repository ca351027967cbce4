//! # Purchase Unit-of-Work
//!
//! The one multi-entity mutation in the system: a purchase decrements the
//! product's inventory and the buyer's balance. Both updates run inside a
//! single transaction so a failure between them can neither lose money nor
//! inventory.
//!
//! ## Conditional Decrements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    UPDATE products SET amount_available = amount_available - qty       │
//! │    WHERE id = ? AND amount_available >= qty                            │
//! │        └── 0 rows → ROLLBACK, InsufficientStock                        │
//! │    UPDATE users SET deposit = deposit - total                          │
//! │    WHERE id = ? AND deposit >= total                                   │
//! │        └── 0 rows → ROLLBACK, InsufficientFunds                        │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guards make concurrent purchases safe: two buyers racing for the
//! last unit both pass the engine's read-time validation, but only one
//! conditional update can match, and the loser surfaces as an
//! insufficient-inventory outcome instead of overselling.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Result of attempting the purchase unit-of-work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Both decrements applied; carries the post-purchase values read back
    /// from the same transaction.
    Completed {
        deposit_after: i64,
        amount_available_after: i64,
    },

    /// The stock guard did not match: the product vanished or another
    /// purchase drained it first. Nothing was mutated.
    InsufficientStock,

    /// The balance guard did not match. Nothing was mutated.
    InsufficientFunds,
}

/// Repository executing the atomic purchase.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Runs the purchase transaction.
    ///
    /// `total_cost` is `cost * quantity`, computed and validated by the
    /// engine; this method only enforces the guards against current state.
    pub async fn execute(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i64,
        total_cost: i64,
    ) -> DbResult<PurchaseOutcome> {
        debug!(
            user_id = user_id,
            product_id = product_id,
            quantity = quantity,
            total_cost = total_cost,
            "Executing purchase"
        );

        let mut tx = self.pool.begin().await?;

        let amount_available_after: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET amount_available = amount_available - ?1
            WHERE id = ?2 AND amount_available >= ?1
            RETURNING amount_available
            "#,
        )
        .bind(quantity)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(amount_available_after) = amount_available_after else {
            tx.rollback().await?;
            return Ok(PurchaseOutcome::InsufficientStock);
        };

        let deposit_after: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET deposit = deposit - ?1
            WHERE id = ?2 AND deposit >= ?1
            RETURNING deposit
            "#,
        )
        .bind(total_cost)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(deposit_after) = deposit_after else {
            tx.rollback().await?;
            return Ok(PurchaseOutcome::InsufficientFunds);
        };

        tx.commit().await?;

        Ok(PurchaseOutcome::Completed {
            deposit_after,
            amount_available_after,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::PurchaseOutcome;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use vendo_core::{Product, Role};

    async fn seeded_db() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let seller = db.users().insert("s1", Role::Seller, "hash").await.unwrap();
        let mut buyer = db.users().insert("b1", Role::Buyer, "hash").await.unwrap();
        buyer.deposit = 475;
        db.users().update(&buyer).await.unwrap();

        let product = db
            .products()
            .insert(&Product {
                id: 0,
                name: "Lemonade".to_string(),
                cost: 100,
                amount_available: 20,
                seller_id: seller.id,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        (db, buyer.id, product.id)
    }

    #[tokio::test]
    async fn successful_purchase_decrements_both_sides() {
        let (db, buyer_id, product_id) = seeded_db().await;

        let outcome = db
            .purchases()
            .execute(buyer_id, product_id, 2, 200)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PurchaseOutcome::Completed {
                deposit_after: 275,
                amount_available_after: 18,
            }
        );

        let buyer = db.users().get_by_id(buyer_id).await.unwrap().unwrap();
        let product = db.products().get(product_id).await.unwrap().unwrap();
        assert_eq!(buyer.deposit, 275);
        assert_eq!(product.amount_available, 18);
    }

    #[tokio::test]
    async fn stock_guard_leaves_state_untouched() {
        let (db, buyer_id, product_id) = seeded_db().await;

        let outcome = db
            .purchases()
            .execute(buyer_id, product_id, 21, 2100)
            .await
            .unwrap();
        assert_eq!(outcome, PurchaseOutcome::InsufficientStock);

        let buyer = db.users().get_by_id(buyer_id).await.unwrap().unwrap();
        let product = db.products().get(product_id).await.unwrap().unwrap();
        assert_eq!(buyer.deposit, 475);
        assert_eq!(product.amount_available, 20);
    }

    #[tokio::test]
    async fn funds_guard_rolls_back_the_stock_decrement() {
        let (db, buyer_id, product_id) = seeded_db().await;

        // 5 units cost 500 but the buyer holds 475: stock decrement applies
        // inside the transaction, then the balance guard fails and the
        // whole unit of work rolls back.
        let outcome = db
            .purchases()
            .execute(buyer_id, product_id, 5, 500)
            .await
            .unwrap();
        assert_eq!(outcome, PurchaseOutcome::InsufficientFunds);

        let buyer = db.users().get_by_id(buyer_id).await.unwrap().unwrap();
        let product = db.products().get(product_id).await.unwrap().unwrap();
        assert_eq!(buyer.deposit, 475);
        assert_eq!(product.amount_available, 20);
    }

    #[tokio::test]
    async fn missing_product_reads_as_insufficient_stock() {
        let (db, buyer_id, _) = seeded_db().await;

        let outcome = db
            .purchases()
            .execute(buyer_id, 424242, 1, 100)
            .await
            .unwrap();
        assert_eq!(outcome, PurchaseOutcome::InsufficientStock);
    }
}
