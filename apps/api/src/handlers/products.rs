//! Product handlers: public catalog reads, ownership-gated writes, and the
//! purchase endpoint.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use crate::auth::require_permission;
use crate::dto::{Envelope, ListQuery, ProductRequest};
use crate::error::ApiError;
use crate::state::AppState;
use vendo_core::{Identity, PERMISSION_PRODUCTS_BUY, PERMISSION_PRODUCTS_WRITE};
use vendo_engine::ProductInput;

impl From<ProductRequest> for ProductInput {
    fn from(request: ProductRequest) -> Self {
        ProductInput {
            name: request.name,
            cost: request.cost,
            amount_available: request.amount_available,
        }
    }
}

/// `GET /v1/products` - public catalog listing.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope>, ApiError> {
    let (products, metadata) = state.services.products.list(query.filters()).await?;

    Ok(Json(Envelope::success(json!({
        "products": products,
        "metadata": metadata,
    }))))
}

/// `GET /v1/products/{id}` - public single-product read.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope>, ApiError> {
    let product = state.services.products.get(id).await?;

    Ok(Json(Envelope::success(json!({ "product": product }))))
}

/// `POST /v1/products` - create a product. Requires the write capability;
/// the new product is owned by the acting seller.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<ProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let seller = require_permission(&state, &identity, PERMISSION_PRODUCTS_WRITE).await?;

    let product = state.services.products.create(&seller, input.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(json!({ "product": product }))),
    ))
}

/// `PUT /v1/products/{id}` - update an owned product.
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(input): Json<ProductRequest>,
) -> Result<Json<Envelope>, ApiError> {
    let seller = require_permission(&state, &identity, PERMISSION_PRODUCTS_WRITE).await?;

    let product = state
        .services
        .products
        .update(&seller, id, input.into())
        .await?;

    Ok(Json(Envelope::success(json!({ "product": product }))))
}

/// `DELETE /v1/products/{id}` - delete an owned product.
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope>, ApiError> {
    let seller = require_permission(&state, &identity, PERMISSION_PRODUCTS_WRITE).await?;

    state.services.products.remove(&seller, id).await?;

    Ok(Json(Envelope::message("Product deleted successfully")))
}

/// `GET /v1/products/{id}/buy/{amount}` - purchase. Requires the buy
/// capability; returns the receipt with the change sequence.
pub async fn buy(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((id, amount)): Path<(i64, i64)>,
) -> Result<Json<Envelope>, ApiError> {
    let buyer = require_permission(&state, &identity, PERMISSION_PRODUCTS_BUY).await?;

    let product = state.services.products.get(id).await?;
    let receipt = state
        .services
        .transactions
        .buy_product(&buyer, &product, amount)
        .await?;

    Ok(Json(Envelope::success(json!(receipt))))
}
