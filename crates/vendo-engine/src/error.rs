//! # Engine Errors
//!
//! The three-way outcome of every service operation, folded into one error
//! enum so callers can match on kind:
//!
//! - `Validation` - the caller's input was semantically invalid; carries
//!   the field → message map and is always produced BEFORE any mutation
//! - `Domain` - an expected business outcome (not found, no permission,
//!   invalid credentials, duplicates), compared by variant
//! - everything else - infrastructure failures propagated unchanged

use thiserror::Error;

use vendo_core::{DomainError, ValidationErrors};
use vendo_db::DbError;

/// Error type for all engine service operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Field-keyed validation failure. Checked first; no state was touched.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Expected business outcome, matched by variant.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The OS entropy source could not be read while issuing a token.
    /// Fatal to the single request, not to the process.
    #[error("could not read from the entropy source: {0}")]
    RandomSource(String),

    /// Hashing or verifying a password failed for a reason other than a
    /// mismatch (a mismatch is `Domain(InvalidCredentials)`).
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// Infrastructure failure from the persistence layer, propagated
    /// unchanged.
    #[error(transparent)]
    Db(DbError),
}

impl EngineError {
    /// The domain kind, if this is a domain outcome.
    pub fn domain(&self) -> Option<DomainError> {
        match self {
            EngineError::Domain(kind) => Some(*kind),
            _ => None,
        }
    }

    /// The validation map, if this is a validation failure.
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            EngineError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for EngineError {
    fn from(errors: ValidationErrors) -> Self {
        EngineError::Validation(errors)
    }
}

/// A row that an update/delete expected but did not find is the domain
/// not-found outcome; every other database error stays infrastructure.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => EngineError::Domain(DomainError::RecordNotFound),
            other => EngineError::Db(other),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_not_found_becomes_domain_not_found() {
        let err: EngineError = DbError::not_found("product", 7).into();
        assert_eq!(err.domain(), Some(DomainError::RecordNotFound));

        let err: EngineError = DbError::PoolExhausted.into();
        assert!(err.domain().is_none());
        assert!(matches!(err, EngineError::Db(DbError::PoolExhausted)));
    }
}
