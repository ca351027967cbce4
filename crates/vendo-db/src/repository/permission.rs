//! # Permission Repository
//!
//! Capability assignment and lookup through the users ↔ permissions join
//! table. Assignment happens once, at account creation; there is no
//! removal path through this repository.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use vendo_core::Permissions;

/// Repository for permission database operations.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: SqlitePool,
}

impl PermissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PermissionRepository { pool }
    }

    /// Grants the given capability codes to a user, in one transaction.
    /// Codes must exist in the permissions table (they are seeded by the
    /// schema migration); unknown codes grant nothing.
    pub async fn add_for_user(&self, user_id: i64, codes: &[&str]) -> DbResult<()> {
        debug!(user_id = user_id, codes = ?codes, "Assigning permissions");

        let mut tx = self.pool.begin().await?;

        for code in codes {
            sqlx::query(
                r#"
                INSERT INTO users_permissions (user_id, permission_id)
                SELECT ?1, id FROM permissions WHERE code = ?2
                "#,
            )
            .bind(user_id)
            .bind(code)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Loads the capability set persisted for a user. Unknown users simply
    /// have an empty set.
    pub async fn get_all_for_user(&self, user_id: i64) -> DbResult<Permissions> {
        let codes: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT permissions.code
            FROM permissions
            INNER JOIN users_permissions ON users_permissions.permission_id = permissions.id
            WHERE users_permissions.user_id = ?1
            ORDER BY permissions.code
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Permissions::new(codes))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use vendo_core::{
        Role, PERMISSION_PRODUCTS_BUY, PERMISSION_PRODUCTS_READ, PERMISSION_PRODUCTS_WRITE,
    };

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn role_permissions_round_trip() {
        let db = test_db().await;
        let buyer = db.users().insert("b1", Role::Buyer, "hash").await.unwrap();
        let repo = db.permissions();

        repo.add_for_user(buyer.id, Role::Buyer.permissions())
            .await
            .unwrap();

        let perms = repo.get_all_for_user(buyer.id).await.unwrap();
        assert!(perms.includes(PERMISSION_PRODUCTS_READ));
        assert!(perms.includes(PERMISSION_PRODUCTS_BUY));
        assert!(!perms.includes(PERMISSION_PRODUCTS_WRITE));
    }

    #[tokio::test]
    async fn unknown_user_has_empty_set() {
        let db = test_db().await;
        let perms = db.permissions().get_all_for_user(424242).await.unwrap();
        assert!(perms.is_empty());
    }

    #[tokio::test]
    async fn unknown_code_grants_nothing() {
        let db = test_db().await;
        let user = db.users().insert("b1", Role::Buyer, "hash").await.unwrap();
        let repo = db.permissions();

        repo.add_for_user(user.id, &["products:launch"]).await.unwrap();
        assert!(repo.get_all_for_user(user.id).await.unwrap().is_empty());
    }
}
