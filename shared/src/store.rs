//! Authoritative store abstractions
//!
//! One production implementation per entity on PostgreSQL and one in-memory
//! implementation for tests. The store is the single source of truth; the
//! cache only ever holds derived copies.

use crate::{
    clock::Clock,
    error::AppError,
    models::{NewProduct, NewUser, Product, User},
    Result,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sqlx::PgPool;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Product>>;
    async fn get_by_id(&self, id: i32) -> Result<Option<Product>>;
    async fn create(&self, new: NewProduct) -> Result<Product>;
    /// Persists the given fields and stamps `updated_at`.
    async fn update(&self, product: &Product) -> Result<Product>;
    async fn delete(&self, id: i32) -> Result<bool>;
    async fn exists(&self, id: i32) -> Result<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: i32) -> Result<Option<User>>;
    async fn create(&self, new: NewUser) -> Result<User>;
    async fn update(&self, user: &User) -> Result<User>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn username_exists(&self, username: &str) -> Result<bool>;
    async fn email_exists(&self, email: &str) -> Result<bool>;
    async fn get_by_refresh_token(&self, refresh_token: &str) -> Result<Option<User>>;
}

// --- PostgreSQL implementations ---

#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn get_all(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price, stock, created_at, updated_at
             FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price, stock, created_at, updated_at
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn create(&self, new: NewProduct) -> Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, description, price, stock, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, description, price, stock, created_at, updated_at",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.stock)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn update(&self, product: &Product) -> Result<Product> {
        let updated = sqlx::query_as::<_, Product>(
            "UPDATE products
             SET name = $1, description = $2, price = $3, stock = $4, updated_at = $5
             WHERE id = $6
             RETURNING id, name, description, price, stock, created_at, updated_at",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(Utc::now())
        .bind(product.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: i32) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, refresh_token, \
                            refresh_token_expiry, created_at, updated_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, new: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users
                 (username, email, password_hash, role, refresh_token,
                  refresh_token_expiry, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.role)
        .bind(&new.refresh_token)
        .bind(new.refresh_token_expiry)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User> {
        let updated = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET username = $1, email = $2, password_hash = $3, role = $4,
                 refresh_token = $5, refresh_token_expiry = $6, updated_at = $7
             WHERE id = $8
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(&user.refresh_token)
        .bind(user.refresh_token_expiry)
        .bind(Utc::now())
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn get_by_refresh_token(&self, refresh_token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE refresh_token = $1",
            USER_COLUMNS
        ))
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

// --- In-memory implementations for tests ---

pub struct InMemoryProductStore {
    rows: DashMap<i32, Product>,
    next_id: AtomicI32,
    clock: Arc<dyn Clock>,
}

impl InMemoryProductStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI32::new(1),
            clock,
        }
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn get_all(&self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self.rows.iter().map(|r| r.value().clone()).collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Product>> {
        Ok(self.rows.get(&id).map(|r| r.value().clone()))
    }

    async fn create(&self, new: NewProduct) -> Result<Product> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let product = Product {
            id,
            name: new.name,
            description: new.description,
            price: new.price,
            stock: new.stock,
            created_at: self.clock.now(),
            updated_at: None,
        };
        self.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn update(&self, product: &Product) -> Result<Product> {
        if !self.rows.contains_key(&product.id) {
            return Err(AppError::not_found("Product"));
        }
        let mut updated = product.clone();
        updated.updated_at = Some(self.clock.now());
        self.rows.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        Ok(self.rows.remove(&id).is_some())
    }

    async fn exists(&self, id: i32) -> Result<bool> {
        Ok(self.rows.contains_key(&id))
    }
}

pub struct InMemoryUserStore {
    rows: DashMap<i32, User>,
    next_id: AtomicI32,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI32::new(1),
            clock,
        }
    }

    fn find<F>(&self, predicate: F) -> Option<User>
    where
        F: Fn(&User) -> bool,
    {
        self.rows
            .iter()
            .find(|r| predicate(r.value()))
            .map(|r| r.value().clone())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        Ok(self.rows.get(&id).map(|r| r.value().clone()))
    }

    async fn create(&self, new: NewUser) -> Result<User> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = User {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            refresh_token: new.refresh_token,
            refresh_token_expiry: new.refresh_token_expiry,
            created_at: self.clock.now(),
            updated_at: None,
        };
        self.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User> {
        if !self.rows.contains_key(&user.id) {
            return Err(AppError::not_found("User"));
        }
        let mut updated = user.clone();
        updated.updated_at = Some(self.clock.now());
        self.rows.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.find(|u| u.username == username))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.find(|u| u.email == email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        Ok(self.find(|u| u.username == username).is_some())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.find(|u| u.email == email).is_some())
    }

    async fn get_by_refresh_token(&self, refresh_token: &str) -> Result<Option<User>> {
        Ok(self.find(|u| u.refresh_token.as_deref() == Some(refresh_token)))
    }
}
