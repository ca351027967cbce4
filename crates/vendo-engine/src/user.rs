//! # User Service
//!
//! Account registration and login.
//!
//! ## Registration Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate username / password / role                                   │
//! │       │ (any failure → field-keyed errors, nothing persisted)          │
//! │       ▼                                                                 │
//! │  argon2 hash (plaintext never stored)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT user ── duplicate username → validation error on "username"    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  assign role capabilities (seller → read+write, buyer → read+buy)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Login collapses unknown-username and wrong-password into the single
//! `InvalidCredentials` outcome and issues a 24 h authentication token.

use argon2::password_hash::{
    rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString,
};
use argon2::Argon2;
use chrono::Duration;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::permission::PermissionService;
use crate::token::{TokenService, AUTH_TOKEN_TTL_HOURS};
use vendo_core::validation::{validate_password_plaintext, validate_username};
use vendo_core::{DomainError, Role, Token, User, Validator, SCOPE_AUTHENTICATION};
use vendo_db::UserRepository;

/// Service for account registration and authentication.
#[derive(Debug, Clone)]
pub struct UserService {
    users: UserRepository,
    tokens: TokenService,
    permissions: PermissionService,
}

impl UserService {
    pub fn new(users: UserRepository, tokens: TokenService, permissions: PermissionService) -> Self {
        UserService {
            users,
            tokens,
            permissions,
        }
    }

    /// Registers a new account and grants its role capabilities.
    ///
    /// `role` arrives as the wire string; anything other than `seller` or
    /// `buyer` is a validation failure, so no other role value can ever
    /// reach the permission mapping.
    pub async fn create(&self, username: &str, password: &str, role: &str) -> EngineResult<User> {
        let mut v = Validator::new();
        validate_username(&mut v, username);
        validate_password_plaintext(&mut v, password);

        let role = match Role::parse(role) {
            Some(role) => role,
            None => {
                v.add_error("role", "must be seller or buyer");
                return Err(v.into_errors().into());
            }
        };
        v.finish()?;

        let password_hash = hash_password(password)?;

        let user = match self.users.insert(username, role, &password_hash).await {
            Ok(user) => user,
            Err(err) if err.violates_unique("users.username") => {
                let mut v = Validator::new();
                v.add_error("username", "a user with this username already exists");
                return Err(v.into_errors().into());
            }
            Err(err) => return Err(err.into()),
        };

        self.permissions.assign_for_role(user.id, role).await?;

        info!(user_id = user.id, role = %role, "User registered");
        Ok(user)
    }

    /// Verifies a username/password pair and issues an authentication
    /// token with the standard TTL.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller: both are `InvalidCredentials`.
    pub async fn authenticate(&self, username: &str, password: &str) -> EngineResult<Token> {
        let mut v = Validator::new();
        v.check(!username.is_empty(), "username", "must not be empty");
        v.check(!password.is_empty(), "password", "must not be empty");
        v.finish()?;

        let user = self
            .users
            .get_by_username(username)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if !verify_password(&user.password_hash, password)? {
            return Err(DomainError::InvalidCredentials.into());
        }

        let token = self
            .tokens
            .issue(
                user.id,
                Duration::hours(AUTH_TOKEN_TTL_HOURS),
                SCOPE_AUTHENTICATION,
            )
            .await?;

        info!(user_id = user.id, "Authentication token issued");
        Ok(token)
    }

    /// Resolves the user behind a presented bearer token.
    pub async fn user_for_token(&self, plaintext: &str, scope: &str) -> EngineResult<User> {
        self.tokens.resolve(plaintext, scope).await
    }

    /// The persisted capability set for a user.
    pub async fn permissions_for(&self, user_id: i64) -> EngineResult<vendo_core::Permissions> {
        self.permissions.permissions_for(user_id).await
    }

    /// Fetches a user by id.
    pub async fn get(&self, user_id: i64) -> EngineResult<User> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(EngineError::Domain(DomainError::RecordNotFound))
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a plaintext password into an argon2 PHC string with a fresh
/// random salt.
fn hash_password(password: &str) -> EngineResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| EngineError::PasswordHash(e.to_string()))
}

/// Verifies a plaintext against a stored PHC string. A mismatch is a
/// normal `false`; anything else (corrupt hash, parameter problems) is an
/// infrastructure error.
fn verify_password(stored_hash: &str, password: &str) -> EngineResult<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| EngineError::PasswordHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(EngineError::PasswordHash(e.to_string())),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
