//! # vendo-core: Pure Business Logic for Vendo
//!
//! This crate is the heart of the vending-machine service. It contains the
//! money and inventory rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vendo Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       apps/api (axum)                           │   │
//! │  │      routing • JSON envelopes • auth gates • status codes       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                        vendo-engine                              │   │
//! │  │     tokens • permissions • users • products • transactions      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vendo-core (THIS CRATE) ★                        │   │
//! │  │                                                                  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   coins   │  │ validation │  │   error   │  │   │
//! │  │   │ User/Role │  │ Coin      │  │ Validator  │  │  Domain   │  │   │
//! │  │   │ Product   │  │ Balance   │  │ field maps │  │  errors   │  │   │
//! │  │   │ Token     │  │ change    │  │ rules      │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                  │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬────────────────────────────────────┘  │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vendo-db (SQLite layer)                       │   │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output - the change calculator is
//!    deterministic by construction
//! 2. **Integer money**: every amount is i64 cents; the accepted coin set
//!    makes every balance a non-negative multiple of 5
//! 3. **Explicit errors**: validation failures are field-keyed maps, business
//!    outcomes are typed variants; invariants broken past their validation
//!    point abort loudly instead of persisting bad state

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coins;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use coins::{change_for, Balance, Coin, InvalidBalance};
pub use error::DomainError;
pub use types::*;
pub use validation::{ValidationErrors, Validator};
