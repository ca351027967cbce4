//! # User Repository
//!
//! Database operations for accounts, including the token-join lookup that
//! backs bearer authentication.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vendo_core::{Role, User};

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    role: String,
    deposit: i64,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            DbError::DataCorruption(format!("unknown role '{}' for user {}", row.role, row.id))
        })?;

        Ok(User {
            id: row.id,
            username: row.username,
            role,
            deposit: row.deposit,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new account with a zero deposit.
    ///
    /// ## Returns
    /// * `Ok(User)` - the stored record with its generated id
    /// * `Err(DbError::UniqueViolation)` - username already taken
    pub async fn insert(&self, username: &str, role: Role, password_hash: &str) -> DbResult<User> {
        debug!(username = %username, role = %role, "Inserting user");

        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, role, deposit, password_hash, created_at)
            VALUES (?1, ?2, 0, ?3, ?4)
            "#,
        )
        .bind(username)
        .bind(role.as_str())
        .bind(password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            role,
            deposit: 0,
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    /// Gets a user by username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, role, deposit, password_hash, created_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Gets a user by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, role, deposit, password_hash, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Persists the mutable fields of a user record.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no row with this id
    pub async fn update(&self, user: &User) -> DbResult<()> {
        debug!(id = user.id, deposit = user.deposit, "Updating user");

        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = ?1, password_hash = ?2, deposit = ?3
            WHERE id = ?4
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.deposit)
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", user.id));
        }

        Ok(())
    }

    /// Resolves the user behind an unexpired token, joining through the
    /// tokens table on {hash, scope}.
    ///
    /// Returns `None` for unknown and expired tokens alike; callers cannot
    /// tell the two apart.
    pub async fn get_for_token(
        &self,
        token_hash: &[u8],
        scope: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT users.id, users.username, users.role, users.deposit,
                   users.password_hash, users.created_at
            FROM users
            INNER JOIN tokens ON users.id = tokens.user_id
            WHERE tokens.hash = ?1
              AND tokens.scope = ?2
              AND tokens.expiry > ?3
            "#,
        )
        .bind(token_hash)
        .bind(scope)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
