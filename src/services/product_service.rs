//! Cache-aside product catalog service
//!
//! Reads try the cache first and fall back to the store; every store
//! mutation removes the cache keys that could reference the mutated record
//! before the operation returns. The store stays the single source of truth,
//! so a lost cache entry only costs latency.

use shared::{
    cache::{CacheKeys, CacheStore, CacheTtl},
    error::AppError,
    models::{NewProduct, Product, ProductRequest, ProductResponse},
    store::ProductStore,
    Result,
};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
    cache: Arc<dyn CacheStore>,
    cache_ttl_seconds: u64,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            cache,
            cache_ttl_seconds: CacheTtl::PRODUCTS,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<ProductResponse>> {
        if let Some(cached) = self.cache.get(CacheKeys::PRODUCTS_ALL).await? {
            debug!("Cache hit for {}", CacheKeys::PRODUCTS_ALL);
            return Ok(serde_json::from_str(&cached)?);
        }

        let products = self.store.get_all().await?;
        let responses: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();

        // An empty collection is treated as uncacheable; a cached empty value
        // would be indistinguishable from a miss on the read side.
        if !responses.is_empty() {
            let serialized = serde_json::to_string(&responses)?;
            self.cache
                .set_ex(CacheKeys::PRODUCTS_ALL, &serialized, self.cache_ttl_seconds)
                .await?;
        }

        Ok(responses)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<ProductResponse>> {
        let key = CacheKeys::product(id);

        if let Some(cached) = self.cache.get(&key).await? {
            debug!("Cache hit for {}", key);
            return Ok(Some(serde_json::from_str(&cached)?));
        }

        let Some(product) = self.store.get_by_id(id).await? else {
            return Ok(None);
        };

        let response = ProductResponse::from(product);
        let serialized = serde_json::to_string(&response)?;
        self.cache
            .set_ex(&key, &serialized, self.cache_ttl_seconds)
            .await?;

        Ok(Some(response))
    }

    pub async fn create(&self, request: &ProductRequest) -> Result<ProductResponse> {
        request.validate()?;

        let created = self
            .store
            .create(NewProduct {
                name: request.name.clone(),
                description: request.description.clone(),
                price: request.price,
                stock: request.stock,
            })
            .await?;

        // The per-id key cannot exist yet for a fresh id; only the
        // collection key can be stale.
        self.cache.remove(CacheKeys::PRODUCTS_ALL).await?;

        info!(product_id = created.id, "Product created");
        Ok(created.into())
    }

    pub async fn update(&self, id: i32, request: &ProductRequest) -> Result<ProductResponse> {
        request.validate()?;

        let Some(existing) = self.store.get_by_id(id).await? else {
            return Err(AppError::not_found("Product"));
        };

        let updated = self
            .store
            .update(&Product {
                name: request.name.clone(),
                description: request.description.clone(),
                price: request.price,
                stock: request.stock,
                ..existing
            })
            .await?;

        self.invalidate(id).await?;

        info!(product_id = id, "Product updated");
        Ok(updated.into())
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let deleted = self.store.delete(id).await?;

        if deleted {
            self.invalidate(id).await?;
            info!(product_id = id, "Product deleted");
        }

        Ok(deleted)
    }

    /// Removal, not update: the next read repopulates from the store.
    async fn invalidate(&self, id: i32) -> Result<()> {
        self.cache.remove(CacheKeys::PRODUCTS_ALL).await?;
        self.cache.remove(&CacheKeys::product(id)).await?;
        Ok(())
    }
}
