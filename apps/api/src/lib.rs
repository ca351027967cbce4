//! # vendo-api: HTTP Surface for Vendo
//!
//! Thin axum layer over the engine: routing, JSON envelopes, the bearer
//! authentication gate and the capability gate. Exposed as a library so
//! the integration tests can drive the router in-process.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use routes::build_router;
pub use state::AppState;
