//! User handlers: registration, coin deposit and balance reset.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use crate::auth::require_permission;
use crate::dto::{CreateUserRequest, Envelope};
use crate::error::ApiError;
use crate::state::AppState;
use vendo_core::{Identity, PERMISSION_PRODUCTS_BUY};

/// `POST /v1/users` - open registration.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .services
        .users
        .create(&input.username, &input.password, &input.role)
        .await?;

    let location = format!("/v1/users/{}", user.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(Envelope::success(json!({ "user": user }))),
    ))
}

/// `GET /v1/users/deposit/{amount}` - insert one coin. Requires the buy
/// capability.
pub async fn deposit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(amount): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_permission(&state, &identity, PERMISSION_PRODUCTS_BUY).await?;

    let user = state.services.transactions.deposit_coin(&user, amount).await?;

    Ok(Json(Envelope::success_with_message(
        "Deposit was successful",
        json!({ "user": user }),
    )))
}

/// `GET /v1/users/deposit/reset` - zero the balance. Requires the buy
/// capability.
pub async fn reset(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_permission(&state, &identity, PERMISSION_PRODUCTS_BUY).await?;

    let user = state.services.transactions.deposit_reset(&user).await?;

    Ok(Json(Envelope::success_with_message(
        "Reset balance was successful",
        json!({ "user": user }),
    )))
}
