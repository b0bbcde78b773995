//! Product catalog trait and implementations.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::ProductId;
use order_store::{OrderStore, Product};

use crate::error::StorefrontError;

/// Source of current product prices and stock levels.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Looks up a product with its current stock.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StorefrontError>;

    /// Lists every product.
    async fn list(&self) -> Result<Vec<Product>, StorefrontError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: BTreeMap<ProductId, Product>,
    fail_on_get: bool,
}

/// In-memory product catalog for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryProductCatalog {
    /// Creates a new empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn upsert(&self, product: Product) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .products
            .insert(product.id, product);
    }

    /// Configures the catalog to fail on lookups.
    pub fn set_fail_on_get(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_get = fail;
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StorefrontError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.fail_on_get {
            return Err(StorefrontError::CatalogService(
                "Catalog unavailable".to_string(),
            ));
        }
        Ok(state.products.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StorefrontError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.products.values().cloned().collect())
    }
}

/// Catalog backed by the order store, so prices and stock are always live.
#[derive(Clone)]
pub struct StoreCatalog<S> {
    store: S,
}

impl<S: OrderStore> StoreCatalog<S> {
    /// Creates a catalog over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: OrderStore> ProductCatalog for StoreCatalog<S> {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StorefrontError> {
        Ok(self.store.get_product(id).await?)
    }

    async fn list(&self) -> Result<Vec<Product>, StorefrontError> {
        Ok(self.store.list_products().await?)
    }
}
