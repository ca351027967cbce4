//! Healthcheck handler.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::dto::Envelope;
use crate::state::AppState;

/// `GET /v1/healthcheck` - liveness plus build information.
pub async fn healthcheck(State(state): State<AppState>) -> Json<Envelope> {
    Json(Envelope::success(json!({
        "status": "available",
        "system_info": {
            "environment": state.config.environment,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })))
}
