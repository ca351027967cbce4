//! # Domain Types
//!
//! Core domain types used throughout Vendo.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Product     │   │      Token      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  plaintext      │       │
//! │  │  username       │   │  name           │   │  hash (stored)  │       │
//! │  │  role           │   │  cost (cents)   │   │  user_id        │       │
//! │  │  deposit (cents)│   │  amount_avail.  │   │  expiry         │       │
//! │  │  password_hash  │   │  seller_id      │   │  scope          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Identity = Anonymous | User(User)   Permissions = capability codes    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Capability Codes & Token Scopes
// =============================================================================

/// Capability granted to every account: browse the product catalog.
pub const PERMISSION_PRODUCTS_READ: &str = "products:read";

/// Capability to create, update and delete owned products.
pub const PERMISSION_PRODUCTS_WRITE: &str = "products:write";

/// Capability to deposit coins and buy products.
pub const PERMISSION_PRODUCTS_BUY: &str = "products:buy";

/// Token scope for login-issued authentication tokens.
pub const SCOPE_AUTHENTICATION: &str = "authentication";

/// The set of capability codes persisted for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(Vec<String>);

impl Permissions {
    pub fn new(codes: Vec<String>) -> Self {
        Permissions(codes)
    }

    /// Membership test used by the authorization gate.
    pub fn includes(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

// =============================================================================
// Role
// =============================================================================

/// Account role, fixed at registration.
///
/// The role is only consulted once, at account creation, to derive the
/// permanent capability set. Request-time authorization reads the persisted
/// capabilities, never the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Seller,
    Buyer,
}

impl Role {
    /// Parses the wire representation. Unknown strings are rejected at the
    /// registration boundary as a validation failure.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "seller" => Some(Role::Seller),
            "buyer" => Some(Role::Buyer),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Seller => "seller",
            Role::Buyer => "buyer",
        }
    }

    /// The capability codes granted to a new account with this role.
    ///
    /// Sellers manage a catalog, buyers spend against it; everyone reads.
    pub fn permissions(self) -> &'static [&'static str] {
        match self {
            Role::Seller => &[PERMISSION_PRODUCTS_READ, PERMISSION_PRODUCTS_WRITE],
            Role::Buyer => &[PERMISSION_PRODUCTS_READ, PERMISSION_PRODUCTS_BUY],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// User & Identity
// =============================================================================

/// A registered account.
///
/// `deposit` is integer cents and is always a non-negative multiple of 5
/// (it can only grow by accepted coins and shrink by purchase costs, which
/// are themselves multiples of 5). `password_hash` is an argon2 PHC string;
/// the plaintext is hashed at the registration boundary and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    /// Current balance in cents.
    pub deposit: i64,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The caller identity attached to a request after authentication.
///
/// An unauthenticated caller is `Anonymous`, a real value rather than a
/// null, so permission checks can reject it without special-casing missing
/// users anywhere downstream.
#[derive(Debug, Clone)]
pub enum Identity {
    Anonymous,
    User(User),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product listed by a seller.
///
/// `cost` is integer cents, strictly greater than 5 and a multiple of 5 so
/// any purchase leaves the buyer's balance payable in coins. Only the
/// owning seller may mutate or delete the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Price per unit in cents.
    pub cost: i64,
    pub amount_available: i64,
    pub seller_id: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Token
// =============================================================================

/// Length in characters of every token plaintext: 16 random bytes encoded
/// as unpadded base32.
pub const TOKEN_PLAINTEXT_LEN: usize = 26;

/// An ephemeral bearer credential.
///
/// The plaintext is returned to the caller exactly once at issue time.
/// Only the SHA-256 `hash` is persisted and matched on later requests, so
/// a leaked token table cannot be replayed.
#[derive(Debug, Clone)]
pub struct Token {
    pub plaintext: String,
    pub hash: Vec<u8>,
    pub user_id: i64,
    pub expiry: DateTime<Utc>,
    pub scope: String,
}

// =============================================================================
// List Filters & Pagination Metadata
// =============================================================================

/// Paging parameters for catalog listings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProductFilters {
    pub page: i64,
    pub page_size: i64,
}

impl Default for ProductFilters {
    fn default() -> Self {
        ProductFilters {
            page: 1,
            page_size: 20,
        }
    }
}

impl ProductFilters {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Pagination metadata returned alongside a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    /// Derives the page window from a total record count. An empty result
    /// set yields the zero value.
    pub fn new(total_records: i64, page: i64, page_size: i64) -> Metadata {
        if total_records == 0 {
            return Metadata::default();
        }

        Metadata {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_round_trip() {
        assert_eq!(Role::parse("seller"), Some(Role::Seller));
        assert_eq!(Role::parse("buyer"), Some(Role::Buyer));
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::Seller.as_str(), "seller");
    }

    #[test]
    fn role_permission_sets() {
        assert_eq!(
            Role::Seller.permissions(),
            &[PERMISSION_PRODUCTS_READ, PERMISSION_PRODUCTS_WRITE]
        );
        assert_eq!(
            Role::Buyer.permissions(),
            &[PERMISSION_PRODUCTS_READ, PERMISSION_PRODUCTS_BUY]
        );
    }

    #[test]
    fn permissions_membership() {
        let perms = Permissions::new(vec![
            PERMISSION_PRODUCTS_READ.to_string(),
            PERMISSION_PRODUCTS_BUY.to_string(),
        ]);

        assert!(perms.includes(PERMISSION_PRODUCTS_BUY));
        assert!(!perms.includes(PERMISSION_PRODUCTS_WRITE));
        assert!(!Permissions::default().includes(PERMISSION_PRODUCTS_READ));
    }

    #[test]
    fn anonymous_identity_has_no_user() {
        let identity = Identity::Anonymous;
        assert!(identity.is_anonymous());
        assert!(identity.user().is_none());
    }

    #[test]
    fn metadata_page_window() {
        let meta = Metadata::new(101, 2, 20);
        assert_eq!(meta.current_page, 2);
        assert_eq!(meta.first_page, 1);
        assert_eq!(meta.last_page, 6);
        assert_eq!(meta.total_records, 101);

        assert_eq!(Metadata::new(0, 1, 20), Metadata::default());
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = User {
            id: 1,
            username: "tester".to_string(),
            role: Role::Buyer,
            deposit: 45,
            password_hash: "$argon2id$v=19$secret".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"username\":\"tester\""));
    }
}
