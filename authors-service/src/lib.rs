//! # authors-service
//!
//! REST resource for authors and their books, served by axum.
//!
//! ## Features
//!
//! - **Authors resource**: list, create, show, update (PUT/PATCH) and delete at
//!   `/authors` and `/api/authors`
//! - **Validation**: declarative rule sets with per-field error messages
//! - **Storage**: in-memory tables or PostgreSQL through sqlx
//! - **Middleware stack**: request ids, body limits, timeouts, CORS, compression,
//!   panic recovery
//! - **Health checks**: liveness and readiness probes
//! - **Graceful shutdown**: SIGTERM and SIGINT handling
//!
//! ## Example
//!
//! ```rust,no_run
//! use authors_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::new(config.clone(), InMemoryAuthorStore::new());
//!     Server::new(config).serve(router(state)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repository;
pub mod routes;
pub mod server;
pub mod state;
pub mod validation;

#[cfg(feature = "database")]
pub mod database;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, StorageBackend};
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{ApiError, AuthorHandler, ListQuery};
    pub use crate::health::{health, readiness};
    pub use crate::models::{Author, AuthorChanges, AuthorWithBooks, Book, NewAuthor};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{AuthorStore, InMemoryAuthorStore, UniqueLookup};
    pub use crate::routes::router;
    pub use crate::server::Server;
    pub use crate::state::AppState;

    #[cfg(feature = "database")]
    pub use crate::repository::PgAuthorStore;
}
