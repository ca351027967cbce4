//! # Token Repository
//!
//! Storage for opaque bearer tokens. Only the hash column ever holds
//! credential material; rows are inserted at login and bulk-deleted on
//! revocation, never updated.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use vendo_core::Token;

/// Repository for token database operations.
#[derive(Debug, Clone)]
pub struct TokenRepository {
    pool: SqlitePool,
}

impl TokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TokenRepository { pool }
    }

    /// Persists a freshly-issued token. The plaintext on the passed value
    /// is intentionally not written anywhere.
    pub async fn insert(&self, token: &Token) -> DbResult<()> {
        debug!(user_id = token.user_id, scope = %token.scope, "Inserting token");

        sqlx::query(
            r#"
            INSERT INTO tokens (hash, user_id, expiry, scope)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&token.hash)
        .bind(token.user_id)
        .bind(token.expiry)
        .bind(&token.scope)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes every token for a (user, scope) pair. Idempotent: deleting
    /// when none exist is not an error. Returns the number of rows removed.
    pub async fn delete_all_for_user_scope(&self, user_id: i64, scope: &str) -> DbResult<u64> {
        debug!(user_id = user_id, scope = %scope, "Revoking tokens");

        let result = sqlx::query("DELETE FROM tokens WHERE user_id = ?1 AND scope = ?2")
            .bind(user_id)
            .bind(scope)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, Utc};
    use vendo_core::{Role, Token, SCOPE_AUTHENTICATION};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn token_for(user_id: i64, hash: &[u8], hours_from_now: i64) -> Token {
        Token {
            plaintext: String::new(),
            hash: hash.to_vec(),
            user_id,
            expiry: Utc::now() + Duration::hours(hours_from_now),
            scope: SCOPE_AUTHENTICATION.to_string(),
        }
    }

    #[tokio::test]
    async fn token_join_matches_hash_scope_and_expiry() {
        let db = test_db().await;
        let user = db.users().insert("alice", Role::Buyer, "hash").await.unwrap();
        let tokens = db.tokens();

        tokens.insert(&token_for(user.id, b"live-token-hash", 24)).await.unwrap();
        tokens.insert(&token_for(user.id, b"dead-token-hash", -1)).await.unwrap();

        let users = db.users();
        let now = Utc::now();

        let resolved = users
            .get_for_token(b"live-token-hash", SCOPE_AUTHENTICATION, now)
            .await
            .unwrap();
        assert_eq!(resolved.unwrap().id, user.id);

        // Expired token and wrong scope both come back empty.
        assert!(users
            .get_for_token(b"dead-token-hash", SCOPE_AUTHENTICATION, now)
            .await
            .unwrap()
            .is_none());
        assert!(users
            .get_for_token(b"live-token-hash", "password-reset", now)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn revocation_is_bulk_and_idempotent() {
        let db = test_db().await;
        let user = db.users().insert("alice", Role::Buyer, "hash").await.unwrap();
        let tokens = db.tokens();

        tokens.insert(&token_for(user.id, b"t1", 24)).await.unwrap();
        tokens.insert(&token_for(user.id, b"t2", 24)).await.unwrap();

        let removed = tokens
            .delete_all_for_user_scope(user.id, SCOPE_AUTHENTICATION)
            .await
            .unwrap();
        assert_eq!(removed, 2);

        // Second revocation finds nothing and still succeeds.
        let removed = tokens
            .delete_all_for_user_scope(user.id, SCOPE_AUTHENTICATION)
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }
}
