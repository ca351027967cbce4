//! # Validation Module
//!
//! Field-keyed input validation for Vendo.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Handler (deserialization)                                    │
//! │  └── Type/shape errors → 400 bad request                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  └── Semantic errors collected per field → 422 with a field map        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database constraints                                         │
//! │  └── UNIQUE / FK / NOT NULL as the last line of defense                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation always runs and short-circuits BEFORE any mutation: an
//! operation that fails validation must not have touched persistent state.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::coins::Coin;
use crate::types::{Product, ProductFilters, User};

/// Maximum username length in bytes.
pub const MAX_USERNAME_BYTES: usize = 500;

/// Maximum product name length in bytes.
pub const MAX_PRODUCT_NAME_BYTES: usize = 255;

/// Password plaintext length bounds in bytes.
pub const MIN_PASSWORD_BYTES: usize = 6;
pub const MAX_PASSWORD_BYTES: usize = 72;

// =============================================================================
// ValidationErrors & Validator
// =============================================================================

/// Field name → human-readable message.
///
/// Semantically-invalid caller input always surfaces as one of these maps,
/// never as a hard error; handlers render it verbatim with an
/// unprocessable-entity status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Records a message for a field. The first message per field wins;
    /// later checks on an already-failed field do not overwrite it.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Accumulates validation failures across a set of checks.
///
/// ## Usage
/// ```rust
/// use vendo_core::validation::Validator;
///
/// let mut v = Validator::new();
/// v.check(1 > 0, "quantity", "must be greater than zero");
/// assert!(v.is_valid());
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Validator {
        Validator::default()
    }

    /// Records `message` under `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.errors.add(field, message);
        }
    }

    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the validator: `Ok(())` when every check passed, otherwise
    /// the collected field map.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

// =============================================================================
// Deposit Rules
// =============================================================================

/// Checks a single inserted coin: positive and one of the accepted
/// denominations.
pub fn validate_deposit_coin(v: &mut Validator, amount: i64) {
    v.check(amount > 0, "deposit", "must be greater than zero");
    v.check(
        Coin::from_cents(amount).is_some(),
        "deposit",
        "must be one of the 5, 10, 20, 50 or 100 cent coins",
    );
}

// =============================================================================
// User Rules
// =============================================================================

/// Checks a username against the shared rules. Used at the registration
/// boundary and again by full-record validation.
pub fn validate_username(v: &mut Validator, username: &str) {
    v.check(!username.is_empty(), "username", "must be provided");
    v.check(
        username.len() <= MAX_USERNAME_BYTES,
        "username",
        format!("must not be more than {MAX_USERNAME_BYTES} bytes long"),
    );
}

/// Checks a plaintext password before it is hashed. Applied only at the
/// registration boundary; stored users carry the hash alone.
pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(
        password.len() >= MIN_PASSWORD_BYTES,
        "password",
        format!("must be at least {MIN_PASSWORD_BYTES} bytes long"),
    );
    v.check(
        password.len() <= MAX_PASSWORD_BYTES,
        "password",
        format!("must not be more than {MAX_PASSWORD_BYTES} bytes long"),
    );
}

/// Full validation of a user record before it is persisted.
///
/// The deposit check is the stored-balance invariant (any non-negative
/// multiple of 5, i.e. some sum of accepted coins), not the single-coin
/// rule used for deposits in flight.
///
/// # Panics
///
/// Panics if the password hash is empty. Every construction path hashes
/// the password before building a `User`, so an empty hash here is a
/// programmer error that must not be persisted.
pub fn validate_user(v: &mut Validator, user: &User) {
    validate_username(v, &user.username);

    v.check(
        user.deposit >= 0 && user.deposit % Coin::Five.cents() == 0,
        "deposit",
        "must be a non-negative amount payable in accepted coins",
    );

    if user.password_hash.is_empty() {
        panic!("missing password hash for user");
    }
}

// =============================================================================
// Product Rules
// =============================================================================

/// Full validation of a product record before it is persisted.
pub fn validate_product(v: &mut Validator, product: &Product) {
    v.check(!product.name.is_empty(), "name", "must be provided");
    v.check(
        product.name.len() <= MAX_PRODUCT_NAME_BYTES,
        "name",
        format!("must not be more than {MAX_PRODUCT_NAME_BYTES} bytes long"),
    );

    v.check(product.cost > 5, "cost", "must be greater than 5");
    v.check(product.cost % 5 == 0, "cost", "must be a multiple of 5");

    v.check(
        product.amount_available >= 0,
        "amount_available",
        "must not be negative",
    );
}

/// Checks catalog paging parameters.
pub fn validate_filters(v: &mut Validator, filters: &ProductFilters) {
    v.check(filters.page > 0, "page", "must be greater than zero");
    v.check(
        filters.page <= 10_000_000,
        "page",
        "must be a maximum of 10 million",
    );
    v.check(
        filters.page_size > 0,
        "page_size",
        "must be greater than zero",
    );
    v.check(
        filters.page_size <= 100,
        "page_size",
        "must be a maximum of 100",
    );
}

// =============================================================================
// Unit Tests
// =============================================================================
