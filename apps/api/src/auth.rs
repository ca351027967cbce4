//! Authentication and authorization gates.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  authenticate (middleware, every route)                                │
//! │    no Authorization header    → Identity::Anonymous                    │
//! │    malformed header or token  → 401, request never reaches the handler │
//! │    unknown/expired token      → 401 (indistinguishable by design)      │
//! │    valid token                → Identity::User(user)                   │
//! │                                                                         │
//! │  require_permission (protected handlers)                               │
//! │    anonymous                  → 401 authentication required            │
//! │    capability missing         → 403 forbidden                          │
//! │    capability held            → the acting User                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Request, State};
use axum::http::header::{HeaderMap, HeaderValue, AUTHORIZATION, VARY};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;
use vendo_core::{DomainError, Identity, User, SCOPE_AUTHENTICATION, TOKEN_PLAINTEXT_LEN};

/// Middleware attaching a caller identity to every request.
///
/// A missing Authorization header is not an error: the caller proceeds as
/// `Anonymous` and the capability gate rejects it later if the route is
/// protected.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match identity_from_headers(&state, request.headers()).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .append(VARY, HeaderValue::from_static("Authorization"));
            response
        }
        Err(err) => err.into_response(),
    }
}

async fn identity_from_headers(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Identity, ApiError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Ok(Identity::Anonymous);
    };

    let value = header.to_str().map_err(|_| ApiError::InvalidToken)?;
    let token = value.strip_prefix("Bearer ").ok_or(ApiError::InvalidToken)?;

    // Shape check before any storage round-trip: real tokens are exactly
    // 26 characters.
    if token.is_empty() || token.len() != TOKEN_PLAINTEXT_LEN {
        return Err(ApiError::InvalidToken);
    }

    match state
        .services
        .users
        .user_for_token(token, SCOPE_AUTHENTICATION)
        .await
    {
        Ok(user) => Ok(Identity::User(user)),
        Err(err) if err.domain() == Some(DomainError::RecordNotFound) => {
            Err(ApiError::InvalidToken)
        }
        Err(err) => Err(err.into()),
    }
}

/// Authorization gate for protected handlers.
///
/// Returns the acting user when the capability is held. Denial never runs
/// the protected operation: anonymous callers get the authentication
/// outcome, authenticated ones without the capability get forbidden.
pub async fn require_permission(
    state: &AppState,
    identity: &Identity,
    code: &str,
) -> Result<User, ApiError> {
    let Some(user) = identity.user() else {
        return Err(ApiError::AuthenticationRequired);
    };

    if !state
        .services
        .permissions
        .has_capability(identity, code)
        .await?
    {
        return Err(ApiError::Forbidden);
    }

    Ok(user.clone())
}
