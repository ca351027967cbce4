//! # Product Service
//!
//! Catalog management with per-seller ownership.
//!
//! Every mutating path re-reads the stored product and compares its
//! `seller_id` against the acting user before writing: a mismatch is the
//! `NoPermission` outcome, deliberately distinct from `RecordNotFound`
//! (the HTTP boundary may still choose to present both as not-found to
//! avoid leaking existence - that policy does not live here).

use tracing::info;

use crate::error::{EngineError, EngineResult};
use vendo_core::validation::validate_product;
use vendo_core::{DomainError, Metadata, Product, ProductFilters, User, Validator};
use vendo_db::ProductRepository;

/// Fields a seller controls on a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub cost: i64,
    pub amount_available: i64,
}

/// Service for catalog operations.
#[derive(Debug, Clone)]
pub struct ProductService {
    products: ProductRepository,
}

impl ProductService {
    pub fn new(products: ProductRepository) -> Self {
        ProductService { products }
    }

    /// Lists a catalog page. Paging parameters are validated like any
    /// other caller input.
    pub async fn list(&self, filters: ProductFilters) -> EngineResult<(Vec<Product>, Metadata)> {
        let mut v = Validator::new();
        vendo_core::validation::validate_filters(&mut v, &filters);
        v.finish()?;

        Ok(self.products.list(&filters).await?)
    }

    /// Fetches one product.
    pub async fn get(&self, id: i64) -> EngineResult<Product> {
        self.products
            .get(id)
            .await?
            .ok_or(EngineError::Domain(DomainError::RecordNotFound))
    }

    /// Creates a product owned by the acting seller.
    pub async fn create(&self, seller: &User, input: ProductInput) -> EngineResult<Product> {
        let draft = Product {
            id: 0,
            name: input.name,
            cost: input.cost,
            amount_available: input.amount_available,
            seller_id: seller.id,
            created_at: chrono::Utc::now(),
        };

        let mut v = Validator::new();
        validate_product(&mut v, &draft);
        v.finish()?;

        let product = match self.products.insert(&draft).await {
            Ok(product) => product,
            Err(err) if err.violates_unique("products.name") => {
                return Err(duplicate_name_error());
            }
            Err(err) => return Err(err.into()),
        };

        info!(product_id = product.id, seller_id = seller.id, "Product created");
        Ok(product)
    }

    /// Updates a product the acting user owns.
    ///
    /// Input validation runs before the ownership read, so semantically
    /// invalid fields short-circuit like everywhere else.
    pub async fn update(&self, acting: &User, id: i64, input: ProductInput) -> EngineResult<Product> {
        let draft = Product {
            id,
            name: input.name,
            cost: input.cost,
            amount_available: input.amount_available,
            seller_id: acting.id,
            created_at: chrono::Utc::now(),
        };

        let mut v = Validator::new();
        validate_product(&mut v, &draft);
        v.finish()?;

        let mut candidate = self.get_owned(acting, id).await?;
        candidate.name = draft.name;
        candidate.cost = draft.cost;
        candidate.amount_available = draft.amount_available;

        match self.products.update(&candidate).await {
            Ok(()) => {}
            Err(err) if err.violates_unique("products.name") => {
                return Err(duplicate_name_error());
            }
            Err(err) => return Err(err.into()),
        }

        info!(product_id = id, seller_id = acting.id, "Product updated");
        Ok(candidate)
    }

    /// Deletes a product the acting user owns.
    pub async fn remove(&self, acting: &User, id: i64) -> EngineResult<()> {
        let product = self.get_owned(acting, id).await?;
        self.products.delete(product.id).await?;

        info!(product_id = id, seller_id = acting.id, "Product deleted");
        Ok(())
    }

    /// Loads a product and enforces ownership: only the seller who listed
    /// it may pass. All other fields being valid does not soften the
    /// mismatch.
    async fn get_owned(&self, acting: &User, id: i64) -> EngineResult<Product> {
        let product = self.get(id).await?;

        if product.seller_id != acting.id {
            return Err(DomainError::NoPermission.into());
        }

        Ok(product)
    }
}

fn duplicate_name_error() -> EngineError {
    let mut v = Validator::new();
    v.add_error(
        "name",
        "a product with this name already exists for this seller",
    );
    v.into_errors().into()
}

// =============================================================================
// Unit Tests
// =============================================================================
