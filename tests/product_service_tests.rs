//! Product service tests against the in-memory store and cache backends

use catalog_api::services::ProductService;
use rust_decimal::Decimal;
use shared::{
    cache::{CacheKeys, CacheStore, InMemoryCache},
    clock::SystemClock,
    error::AppError,
    models::ProductRequest,
    store::InMemoryProductStore,
};
use std::sync::Arc;

fn setup() -> (ProductService, Arc<InMemoryCache>) {
    let store = Arc::new(InMemoryProductStore::new(Arc::new(SystemClock)));
    let cache = Arc::new(InMemoryCache::new());
    (ProductService::new(store, cache.clone()), cache)
}

fn widget(name: &str, price: Decimal, stock: i32) -> ProductRequest {
    ProductRequest {
        name: name.to_string(),
        description: None,
        price,
        stock,
    }
}

#[tokio::test]
async fn create_sets_created_timestamp_and_leaves_updated_absent() {
    let (service, _) = setup();

    let created = service
        .create(&widget("Widget", Decimal::new(999, 2), 5))
        .await
        .unwrap();

    assert_eq!(created.name, "Widget");
    assert!(created.id > 0);
    assert!(created.updated_at.is_none());

    let fetched = service.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn update_stamps_updated_at_and_is_visible_immediately() {
    let (service, _) = setup();

    let created = service
        .create(&widget("Widget", Decimal::new(999, 2), 5))
        .await
        .unwrap();

    // Warm both cache keys before the write.
    service.get_all().await.unwrap();
    service.get_by_id(created.id).await.unwrap();

    let updated = service
        .update(created.id, &widget("Widget2", Decimal::new(999, 2), 5))
        .await
        .unwrap();
    assert_eq!(updated.name, "Widget2");
    assert!(updated.updated_at.is_some());

    // Read-after-write: neither key may serve the pre-write value.
    let fetched = service.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Widget2");
    let all = service.get_all().await.unwrap();
    assert_eq!(all[0].name, "Widget2");
}

#[tokio::test]
async fn writes_evict_cache_keys() {
    let (service, cache) = setup();

    let created = service
        .create(&widget("Widget", Decimal::ONE, 1))
        .await
        .unwrap();
    service.get_all().await.unwrap();
    service.get_by_id(created.id).await.unwrap();
    assert!(cache.exists(CacheKeys::PRODUCTS_ALL).await.unwrap());
    assert!(cache.exists(&CacheKeys::product(created.id)).await.unwrap());

    service
        .update(created.id, &widget("Widget2", Decimal::ONE, 1))
        .await
        .unwrap();
    assert!(!cache.exists(CacheKeys::PRODUCTS_ALL).await.unwrap());
    assert!(!cache.exists(&CacheKeys::product(created.id)).await.unwrap());
}

#[tokio::test]
async fn create_evicts_stale_collection_entry() {
    let (service, cache) = setup();

    cache
        .set_ex(CacheKeys::PRODUCTS_ALL, "[]", 300)
        .await
        .unwrap();

    service
        .create(&widget("Widget", Decimal::ONE, 1))
        .await
        .unwrap();

    let all = service.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Widget");
}

#[tokio::test]
async fn reads_are_served_from_cache_until_invalidated() {
    let (service, cache) = setup();

    let created = service
        .create(&widget("Widget", Decimal::ONE, 1))
        .await
        .unwrap();
    let cached = service.get_by_id(created.id).await.unwrap().unwrap();

    // Overwrite the cache entry directly; the next read must come from it.
    let mut doctored = cached.clone();
    doctored.name = "Cached".to_string();
    cache
        .set_ex(
            &CacheKeys::product(created.id),
            &serde_json::to_string(&doctored).unwrap(),
            300,
        )
        .await
        .unwrap();

    let fetched = service.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Cached");
}

#[tokio::test]
async fn repeated_reads_without_writes_are_identical() {
    let (service, _) = setup();

    service
        .create(&widget("Widget", Decimal::new(999, 2), 5))
        .await
        .unwrap();

    let first = service.get_all().await.unwrap();
    let second = service.get_all().await.unwrap();
    assert_eq!(first, second);

    let a = service.get_by_id(first[0].id).await.unwrap();
    let b = service.get_by_id(first[0].id).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn missing_product_read_returns_none_and_does_not_populate_cache() {
    let (service, cache) = setup();

    assert!(service.get_by_id(999).await.unwrap().is_none());
    assert!(!cache.exists(&CacheKeys::product(999)).await.unwrap());
}

#[tokio::test]
async fn empty_collection_is_not_cached() {
    let (service, cache) = setup();

    assert!(service.get_all().await.unwrap().is_empty());
    assert!(!cache.exists(CacheKeys::PRODUCTS_ALL).await.unwrap());
}

#[tokio::test]
async fn validation_runs_before_any_mutation() {
    let (service, _) = setup();

    let cases = [
        widget("", Decimal::ONE, 0),
        widget("Widget", Decimal::ZERO, 0),
        widget("Widget", Decimal::NEGATIVE_ONE, 0),
        widget("Widget", Decimal::ONE, -1),
    ];
    for case in &cases {
        let err = service.create(case).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }), "{:?}", case);
    }

    // Nothing was persisted by the rejected requests.
    assert!(service.get_all().await.unwrap().is_empty());

    // Boundary values are accepted.
    service
        .create(&widget("Widget", Decimal::new(1, 2), 0))
        .await
        .unwrap();
}

#[tokio::test]
async fn update_of_missing_product_is_not_found() {
    let (service, _) = setup();

    let err = service
        .update(42, &widget("Widget", Decimal::ONE, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
async fn delete_reports_absence_as_false_and_evicts_on_success() {
    let (service, cache) = setup();

    assert!(!service.delete(7).await.unwrap());

    let created = service
        .create(&widget("Widget", Decimal::ONE, 1))
        .await
        .unwrap();
    service.get_by_id(created.id).await.unwrap();
    service.get_all().await.unwrap();

    assert!(service.delete(created.id).await.unwrap());
    assert!(!cache.exists(&CacheKeys::product(created.id)).await.unwrap());
    assert!(!cache.exists(CacheKeys::PRODUCTS_ALL).await.unwrap());
    assert!(service.get_by_id(created.id).await.unwrap().is_none());
}
