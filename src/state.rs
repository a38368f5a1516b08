//! Shared application state

use crate::services::{AuthService, ProductService};
use shared::{
    cache::RedisCache,
    clock::SystemClock,
    config::Config,
    error::AppError,
    password::PasswordHasher,
    store::{PgProductStore, PgUserStore},
    token::TokenIssuer,
    Result,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db_pool: PgPool,
    pub redis: Arc<RedisCache>,
    pub products: ProductService,
    pub auth: AuthService,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing database connection pool");
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
            .connect(&config.database.url)
            .await
            .map_err(|e| {
                AppError::configuration(format!("Failed to connect to database: {}", e))
            })?;

        let redis = Arc::new(RedisCache::new(&config.redis).await?);
        let clock = Arc::new(SystemClock);
        let issuer = Arc::new(TokenIssuer::new(&config.auth, clock.clone()));

        let products = ProductService::new(
            Arc::new(PgProductStore::new(db_pool.clone())),
            redis.clone(),
        );
        let auth = AuthService::new(
            &config.auth,
            Arc::new(PgUserStore::new(db_pool.clone())),
            issuer,
            PasswordHasher::default(),
            clock,
        );

        Ok(Self {
            config,
            db_pool,
            redis,
            products,
            auth,
        })
    }
}
