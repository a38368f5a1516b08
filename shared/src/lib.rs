//! Shared library for the catalog backend
//!
//! This library contains the infrastructure used by the API crate:
//! - Configuration loading
//! - Error handling
//! - Database models and DTOs
//! - Store and cache abstractions (PostgreSQL / Redis plus in-memory test backends)
//! - Token issuing and password hashing

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use cache::{CacheKeys, CacheStore, CacheTtl, InMemoryCache, RedisCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{AppError, Result};
pub use models::*;
pub use password::PasswordHasher;
pub use store::{
    InMemoryProductStore, InMemoryUserStore, PgProductStore, PgUserStore, ProductStore, UserStore,
};
pub use token::{AccessClaims, TokenIssuer};
