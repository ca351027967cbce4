//! # Transaction Engine
//!
//! The purchase/balance operations: buy a product, deposit a coin, reset
//! the balance. All three are validate-then-mutate.
//!
//! ## Purchase Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  buy_product(user, product, quantity)                                  │
//! │                                                                         │
//! │  1. VALIDATE against the state the caller saw                          │
//! │     quantity > 0, stock >= quantity, deposit >= cost × quantity        │
//! │     └── any failure → field errors under "product", nothing mutated    │
//! │                                                                         │
//! │  2. EXECUTE the atomic unit-of-work (vendo-db)                         │
//! │     conditional decrements re-check both guards against CURRENT state, │
//! │     so a race that invalidated step 1 surfaces here as a validation    │
//! │     outcome instead of overselling or overdrafting                     │
//! │                                                                         │
//! │  3. RECEIPT: amount spent, product snapshot, change for the new        │
//! │     balance via the greedy calculator                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::info;

use crate::error::EngineResult;
use vendo_core::validation::{validate_deposit_coin, validate_user};
use vendo_core::{change_for, Balance, Coin, Product, User, Validator};
use vendo_db::{PurchaseOutcome, PurchaseRepository, UserRepository};

/// Snapshot of what was bought, as it appears on the receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchasedProduct {
    pub name: String,
    pub cost: i64,
    pub quantity_purchased: i64,
}

/// Result payload of a successful purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub amount_spent: i64,
    pub product: PurchasedProduct,
    /// Coins returned for the remaining balance, largest first.
    pub change: Vec<Coin>,
}

/// Service for purchases and balance movements.
#[derive(Debug, Clone)]
pub struct TransactionService {
    users: UserRepository,
    purchases: PurchaseRepository,
}

impl TransactionService {
    pub fn new(users: UserRepository, purchases: PurchaseRepository) -> Self {
        TransactionService { users, purchases }
    }

    /// Buys `quantity` units of `product` against the user's balance.
    ///
    /// Validation failures come back as a field map keyed `"product"` and
    /// leave every record untouched. The mutation itself is one atomic
    /// unit of work; its guards catch races the read-time validation
    /// cannot see.
    pub async fn buy_product(
        &self,
        user: &User,
        product: &Product,
        quantity: i64,
    ) -> EngineResult<Receipt> {
        let mut v = Validator::new();
        v.check(
            quantity > 0,
            "product",
            "purchase quantity must be greater than zero",
        );
        v.check(
            product.amount_available >= quantity,
            "product",
            format!(
                "not enough quantity only {} remaining",
                product.amount_available
            ),
        );
        v.check(
            user.deposit >= product.cost * quantity,
            "product",
            "you do not have sufficient balance",
        );
        v.finish()?;

        let amount_spent = product.cost * quantity;

        let outcome = self
            .purchases
            .execute(user.id, product.id, quantity, amount_spent)
            .await?;

        let deposit_after = match outcome {
            PurchaseOutcome::Completed { deposit_after, .. } => deposit_after,
            PurchaseOutcome::InsufficientStock => {
                let mut v = Validator::new();
                v.add_error("product", "not enough quantity remaining");
                return Err(v.into_errors().into());
            }
            PurchaseOutcome::InsufficientFunds => {
                let mut v = Validator::new();
                v.add_error("product", "you do not have sufficient balance");
                return Err(v.into_errors().into());
            }
        };

        // Deposit and cost are both multiples of 5, so the remainder must
        // be too; anything else means the balance invariant was already
        // broken before this purchase.
        let balance = Balance::new(deposit_after)
            .unwrap_or_else(|err| panic!("deposit invariant broken after purchase: {err}"));

        info!(
            user_id = user.id,
            product_id = product.id,
            quantity = quantity,
            amount_spent = amount_spent,
            "Purchase completed"
        );

        Ok(Receipt {
            amount_spent,
            product: PurchasedProduct {
                name: product.name.clone(),
                cost: product.cost,
                quantity_purchased: quantity,
            },
            change: change_for(balance),
        })
    }

    /// Inserts one coin into the user's balance.
    ///
    /// Returns the updated user. Anything that is not an accepted
    /// denomination is a validation failure on `"deposit"`.
    pub async fn deposit_coin(&self, user: &User, amount: i64) -> EngineResult<User> {
        let mut v = Validator::new();
        validate_deposit_coin(&mut v, amount);
        v.finish()?;

        let mut updated = user.clone();
        updated.deposit += amount;
        self.users.update(&updated).await?;

        info!(user_id = user.id, amount = amount, "Coin deposited");
        Ok(updated)
    }

    /// Resets the user's balance to zero.
    ///
    /// This path deliberately re-runs FULL user validation, not just the
    /// deposit rule: it is the one mutation that also refuses to persist a
    /// user record that was left invalid in some other field.
    pub async fn deposit_reset(&self, user: &User) -> EngineResult<User> {
        let mut updated = user.clone();
        updated.deposit = 0;

        let mut v = Validator::new();
        validate_user(&mut v, &updated);
        v.finish()?;

        self.users.update(&updated).await?;

        info!(user_id = user.id, "Deposit reset");
        Ok(updated)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
