//! # Permission Service
//!
//! The capability gate in front of every protected operation.
//!
//! Capabilities are derived from the role exactly once, at account
//! creation (`Role::permissions`), persisted, and never changed through
//! this service. At request time only the persisted set is consulted.

use tracing::debug;

use crate::error::EngineResult;
use vendo_core::{Identity, Permissions, Role};
use vendo_db::PermissionRepository;

/// Service resolving persisted capabilities.
#[derive(Debug, Clone)]
pub struct PermissionService {
    permissions: PermissionRepository,
}

impl PermissionService {
    pub fn new(permissions: PermissionRepository) -> Self {
        PermissionService { permissions }
    }

    /// Grants a new account the capability set for its role.
    pub async fn assign_for_role(&self, user_id: i64, role: Role) -> EngineResult<()> {
        self.permissions
            .add_for_user(user_id, role.permissions())
            .await?;
        Ok(())
    }

    /// The persisted capability set for a user.
    pub async fn permissions_for(&self, user_id: i64) -> EngineResult<Permissions> {
        Ok(self.permissions.get_all_for_user(user_id).await?)
    }

    /// Tests whether the caller holds a capability.
    ///
    /// An anonymous identity short-circuits to `false` without a lookup -
    /// it can never hold any capability. Denial at the boundary must map to
    /// a forbidden outcome; the protected operation itself never runs.
    pub async fn has_capability(&self, identity: &Identity, code: &str) -> EngineResult<bool> {
        let Some(user) = identity.user() else {
            return Ok(false);
        };

        let allowed = self
            .permissions
            .get_all_for_user(user.id)
            .await?
            .includes(code);

        if !allowed {
            debug!(user_id = user.id, code = %code, "Capability denied");
        }

        Ok(allowed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use vendo_core::{
        PERMISSION_PRODUCTS_BUY, PERMISSION_PRODUCTS_READ, PERMISSION_PRODUCTS_WRITE,
    };
    use vendo_db::{Database, DbConfig};

    async fn setup() -> (Database, PermissionService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = PermissionService::new(db.permissions());
        (db, service)
    }

    #[tokio::test]
    async fn buyer_gets_read_and_buy_only() {
        let (db, service) = setup().await;
        let buyer = db.users().insert("b1", Role::Buyer, "hash").await.unwrap();

        service.assign_for_role(buyer.id, Role::Buyer).await.unwrap();
        let identity = Identity::User(buyer);

        assert!(service
            .has_capability(&identity, PERMISSION_PRODUCTS_READ)
            .await
            .unwrap());
        assert!(service
            .has_capability(&identity, PERMISSION_PRODUCTS_BUY)
            .await
            .unwrap());
        assert!(!service
            .has_capability(&identity, PERMISSION_PRODUCTS_WRITE)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn seller_gets_read_and_write_only() {
        let (db, service) = setup().await;
        let seller = db.users().insert("s1", Role::Seller, "hash").await.unwrap();

        service
            .assign_for_role(seller.id, Role::Seller)
            .await
            .unwrap();
        let identity = Identity::User(seller);

        assert!(service
            .has_capability(&identity, PERMISSION_PRODUCTS_WRITE)
            .await
            .unwrap());
        assert!(!service
            .has_capability(&identity, PERMISSION_PRODUCTS_BUY)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn anonymous_is_always_denied() {
        let (_db, service) = setup().await;

        for code in [
            PERMISSION_PRODUCTS_READ,
            PERMISSION_PRODUCTS_WRITE,
            PERMISSION_PRODUCTS_BUY,
        ] {
            assert!(!service
                .has_capability(&Identity::Anonymous, code)
                .await
                .unwrap());
        }
    }
}
