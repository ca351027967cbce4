//! Authentication token handler.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::dto::{AuthTokenRequest, Envelope};
use crate::error::ApiError;
use crate::state::AppState;

/// `POST /v1/auth/tokens` - login. Returns the token plaintext exactly
/// once, together with its expiry.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<AuthTokenRequest>,
) -> Result<Json<Envelope>, ApiError> {
    let token = state
        .services
        .users
        .authenticate(&input.username, &input.password)
        .await?;

    Ok(Json(Envelope::success(json!({
        "token": {
            "token": token.plaintext,
            "expiry": token.expiry,
        },
    }))))
}
