//! # Domain Errors
//!
//! Sentinel error kinds shared across the service layers.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationErrors  - field → message map, caller input was semantically│
//! │                      invalid; checked first, short-circuits mutation   │
//! │  DomainError       - THIS MODULE: expected business outcomes matched   │
//! │                      by variant (never by message string)              │
//! │  Infrastructure    - db/pool/entropy failures, defined by the layer    │
//! │                      that produces them and propagated unchanged       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Expected business failures, compared by variant.
///
/// Handlers switch on the kind to pick a status code; the messages are
/// stable but carry no protocol meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomainError {
    /// No matching record. Also covers expired-or-unknown tokens, which are
    /// deliberately indistinguishable to callers.
    #[error("record not found")]
    RecordNotFound,

    /// Login failed: unknown username or wrong password, collapsed into one
    /// outcome.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The acting user is not allowed to touch this record (e.g. mutating
    /// another seller's product). Distinct from `RecordNotFound`; the
    /// boundary may still choose to present both the same way.
    #[error("no permission to perform this action")]
    NoPermission,

    /// Unique username constraint hit on registration.
    #[error("a user with this username already exists")]
    DuplicateUsername,

    /// Unique (name, seller) constraint hit on a product write.
    #[error("a product with this name already exists for this seller")]
    DuplicateProductName,
}
