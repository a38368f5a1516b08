//! Catalog API
//!
//! Product catalog CRUD with a look-aside Redis cache, plus user sessions
//! with rotating refresh tokens. The service layer here orchestrates the
//! store/cache/token collaborators from the `shared` crate; transport is a
//! thin axum layer on top.

pub mod handlers;
pub mod routes;
pub mod services;
pub mod state;

pub use services::{AuthService, ProductService};
pub use state::AppState;
