//! # vendo-engine: Domain Services for Vendo
//!
//! The layer that enforces the business invariants. Every inbound request
//! flows through the same three stages:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. AUTHENTICATE  TokenService::resolve turns a presented bearer       │
//! │                   token into a User (or the caller stays Anonymous)    │
//! │                                                                         │
//! │  2. AUTHORIZE     PermissionService::has_capability tests the          │
//! │                   persisted capability set; anonymous always fails     │
//! │                                                                         │
//! │  3. EXECUTE       UserService / ProductService / TransactionService    │
//! │                   validate caller input, then mutate through vendo-db  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Services are thin structs over cloned repositories; they hold no state
//! of their own between calls, so one instance serves every request
//! concurrently.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod permission;
pub mod product;
pub mod token;
pub mod transaction;
pub mod user;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{EngineError, EngineResult};
pub use permission::PermissionService;
pub use product::{ProductInput, ProductService};
pub use token::{TokenService, AUTH_TOKEN_TTL_HOURS};
pub use transaction::{PurchasedProduct, Receipt, TransactionService};
pub use user::UserService;

use vendo_db::Database;

/// The full service set, wired over one database handle.
///
/// Cloning is cheap; the API app keeps one of these in shared state.
#[derive(Debug, Clone)]
pub struct Services {
    pub tokens: TokenService,
    pub permissions: PermissionService,
    pub users: UserService,
    pub products: ProductService,
    pub transactions: TransactionService,
}

impl Services {
    pub fn new(db: &Database) -> Services {
        let tokens = TokenService::new(db.tokens(), db.users());
        let permissions = PermissionService::new(db.permissions());
        let users = UserService::new(db.users(), tokens.clone(), permissions.clone());
        let products = ProductService::new(db.products());
        let transactions = TransactionService::new(db.users(), db.purchases());

        Services {
            tokens,
            permissions,
            users,
            products,
            transactions,
        }
    }
}
