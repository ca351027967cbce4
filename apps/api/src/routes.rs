//! Route table.
//!
//! Mirrors the service surface:
//!
//! ```text
//! GET    /                                greeting
//! GET    /v1/healthcheck                  liveness + build info
//! POST   /v1/users                        register (open)
//! GET    /v1/users/deposit/reset          reset balance      [products:buy]
//! GET    /v1/users/deposit/{amount}       insert a coin      [products:buy]
//! POST   /v1/auth/tokens                  login (open)
//! GET    /v1/products                     list catalog (open)
//! POST   /v1/products                     create             [products:write]
//! GET    /v1/products/{id}                show (open)
//! PUT    /v1/products/{id}                update owned       [products:write]
//! DELETE /v1/products/{id}                delete owned       [products:write]
//! GET    /v1/products/{id}/buy/{amount}   purchase           [products:buy]
//! ```
//!
//! Capability checks happen inside the handlers via
//! [`crate::auth::require_permission`]; the authenticate middleware runs on
//! every route so even open handlers see a caller identity.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::authenticate;
use crate::dto::Envelope;
use crate::handlers::{healthcheck, products, tokens, users};
use crate::state::AppState;

/// Builds the application router over shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(greeting))
        .route("/v1/healthcheck", get(healthcheck::healthcheck))
        .route("/v1/users", post(users::register))
        .route("/v1/users/deposit/reset", get(users::reset))
        .route("/v1/users/deposit/{amount}", get(users::deposit))
        .route("/v1/auth/tokens", post(tokens::create))
        .route("/v1/products", get(products::list).post(products::create))
        .route(
            "/v1/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/v1/products/{id}/buy/{amount}", get(products::buy))
        .layer(from_fn_with_state(state.clone(), authenticate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn greeting() -> Json<Envelope> {
    Json(Envelope::message("Vendo vending machine"))
}
