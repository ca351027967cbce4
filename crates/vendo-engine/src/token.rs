//! # Token Service
//!
//! Issues, resolves and revokes the opaque bearer tokens used for
//! authentication.
//!
//! ## Token Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  issue()                                                                │
//! │    16 CSPRNG bytes ──► base32 (no padding) ──► 26-char plaintext        │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                          SHA-256(plaintext) = hash                      │
//! │                                     │                                   │
//! │              {hash, user_id, expiry, scope} persisted                   │
//! │              plaintext returned to the caller ONCE                      │
//! │                                                                         │
//! │  resolve()                                                              │
//! │    shape check (26 chars) ──► hash ──► join users through an            │
//! │    unexpired {hash, scope} row                                          │
//! │                                                                         │
//! │  revoke()                                                               │
//! │    DELETE all rows for (user, scope) - idempotent                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storing only the hash means a leaked token table cannot be replayed;
//! the shape check means obviously malformed input never costs a query.
//! There is no renewal: an expired token requires a fresh login.

use chrono::{Duration, Utc};
use data_encoding::BASE32_NOPAD;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use vendo_core::{DomainError, Token, User, TOKEN_PLAINTEXT_LEN};
use vendo_db::{TokenRepository, UserRepository};

/// Lifetime of login-issued authentication tokens.
pub const AUTH_TOKEN_TTL_HOURS: i64 = 24;

/// Service for the token credential lifecycle.
#[derive(Debug, Clone)]
pub struct TokenService {
    tokens: TokenRepository,
    users: UserRepository,
}

impl TokenService {
    pub fn new(tokens: TokenRepository, users: UserRepository) -> Self {
        TokenService { tokens, users }
    }

    /// Generates and persists a new token for a user.
    ///
    /// Returns the token carrying the plaintext - the only time it is ever
    /// visible. Persistence failures propagate unchanged.
    pub async fn issue(&self, user_id: i64, ttl: Duration, scope: &str) -> EngineResult<Token> {
        let token = generate_token(user_id, ttl, scope)?;

        self.tokens.insert(&token).await?;

        debug!(user_id = user_id, scope = %scope, "Token issued");
        Ok(token)
    }

    /// Resolves the user behind a presented plaintext token.
    ///
    /// Malformed plaintexts (wrong length) are rejected without touching
    /// storage. Unknown and expired tokens both come back as
    /// `RecordNotFound` - callers cannot distinguish them.
    pub async fn resolve(&self, plaintext: &str, scope: &str) -> EngineResult<User> {
        if plaintext.is_empty() || plaintext.len() != TOKEN_PLAINTEXT_LEN {
            return Err(DomainError::RecordNotFound.into());
        }

        let hash = Sha256::digest(plaintext.as_bytes());

        self.users
            .get_for_token(hash.as_slice(), scope, Utc::now())
            .await?
            .ok_or(EngineError::Domain(DomainError::RecordNotFound))
    }

    /// Deletes every token a user holds for a scope. Idempotent; used on
    /// credential changes to force re-authentication everywhere.
    pub async fn revoke(&self, user_id: i64, scope: &str) -> EngineResult<()> {
        let removed = self.tokens.delete_all_for_user_scope(user_id, scope).await?;

        debug!(user_id = user_id, scope = %scope, removed = removed, "Tokens revoked");
        Ok(())
    }
}

/// Builds a token from 16 bytes of OS entropy.
///
/// A read failure of the entropy source fails this one request; it is not
/// treated as a process-wide fault.
fn generate_token(user_id: i64, ttl: Duration, scope: &str) -> EngineResult<Token> {
    let mut random_bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut random_bytes)
        .map_err(|e| EngineError::RandomSource(e.to_string()))?;

    let plaintext = BASE32_NOPAD.encode(&random_bytes);
    let hash = Sha256::digest(plaintext.as_bytes()).to_vec();

    Ok(Token {
        plaintext,
        hash,
        user_id,
        expiry: Utc::now() + ttl,
        scope: scope.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use vendo_core::{Role, SCOPE_AUTHENTICATION};
    use vendo_db::{Database, DbConfig};

    async fn service_with_user() -> (TokenService, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().insert("alice", Role::Buyer, "hash").await.unwrap();
        (TokenService::new(db.tokens(), db.users()), user.id)
    }

    #[test]
    fn generated_plaintext_is_26_chars_of_base32() {
        let token = generate_token(1, Duration::hours(24), SCOPE_AUTHENTICATION).unwrap();

        assert_eq!(token.plaintext.len(), TOKEN_PLAINTEXT_LEN);
        assert!(token
            .plaintext
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        assert_eq!(token.hash.len(), 32);
        assert_eq!(
            token.hash,
            Sha256::digest(token.plaintext.as_bytes()).to_vec()
        );
    }

    #[test]
    fn generated_tokens_are_unique() {
        let a = generate_token(1, Duration::hours(1), SCOPE_AUTHENTICATION).unwrap();
        let b = generate_token(1, Duration::hours(1), SCOPE_AUTHENTICATION).unwrap();
        assert_ne!(a.plaintext, b.plaintext);
    }

    #[tokio::test]
    async fn issue_then_resolve_round_trip() {
        let (service, user_id) = service_with_user().await;

        let token = service
            .issue(user_id, Duration::hours(24), SCOPE_AUTHENTICATION)
            .await
            .unwrap();

        let user = service
            .resolve(&token.plaintext, SCOPE_AUTHENTICATION)
            .await
            .unwrap();
        assert_eq!(user.id, user_id);
    }

    #[tokio::test]
    async fn wrong_scope_resolves_to_not_found() {
        let (service, user_id) = service_with_user().await;

        let token = service
            .issue(user_id, Duration::hours(24), SCOPE_AUTHENTICATION)
            .await
            .unwrap();

        let err = service
            .resolve(&token.plaintext, "password-reset")
            .await
            .unwrap_err();
        assert_eq!(err.domain(), Some(DomainError::RecordNotFound));
    }

    #[tokio::test]
    async fn expired_token_resolves_to_not_found() {
        let (service, user_id) = service_with_user().await;

        // Issue with the expiry already in the past.
        let token = service
            .issue(user_id, Duration::hours(-1), SCOPE_AUTHENTICATION)
            .await
            .unwrap();

        let err = service
            .resolve(&token.plaintext, SCOPE_AUTHENTICATION)
            .await
            .unwrap_err();
        assert_eq!(err.domain(), Some(DomainError::RecordNotFound));
    }

    #[tokio::test]
    async fn malformed_plaintext_is_rejected_by_shape() {
        let (service, _) = service_with_user().await;

        for bad in ["", "short", &"X".repeat(TOKEN_PLAINTEXT_LEN + 1)] {
            let err = service
                .resolve(bad, SCOPE_AUTHENTICATION)
                .await
                .unwrap_err();
            assert_eq!(err.domain(), Some(DomainError::RecordNotFound));
        }
    }

    #[tokio::test]
    async fn revoke_invalidates_all_tokens_for_the_scope() {
        let (service, user_id) = service_with_user().await;

        let t1 = service
            .issue(user_id, Duration::hours(24), SCOPE_AUTHENTICATION)
            .await
            .unwrap();
        let t2 = service
            .issue(user_id, Duration::hours(24), SCOPE_AUTHENTICATION)
            .await
            .unwrap();

        service.revoke(user_id, SCOPE_AUTHENTICATION).await.unwrap();

        for plaintext in [&t1.plaintext, &t2.plaintext] {
            let err = service
                .resolve(plaintext, SCOPE_AUTHENTICATION)
                .await
                .unwrap_err();
            assert_eq!(err.domain(), Some(DomainError::RecordNotFound));
        }

        // Revoking again is not an error.
        service.revoke(user_id, SCOPE_AUTHENTICATION).await.unwrap();
    }
}
