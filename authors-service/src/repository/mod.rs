//! Data Store abstraction for authors and their books
//!
//! # Features
//!
//! - **Contract**: [`AuthorStore`] covers paging, lookups with eager-loaded
//!   books, creation, partial update and cascading delete
//! - **Uniqueness**: [`UniqueLookup`] backs the `unique` validation rule
//! - **Backends**: [`InMemoryAuthorStore`] and, with the `database`
//!   feature, [`PgAuthorStore`]
//!
//! # Example
//!
//! ```rust
//! use authors_service::models::NewAuthor;
//! use authors_service::repository::{AuthorStore, InMemoryAuthorStore};
//! use chrono::NaiveDate;
//!
//! # tokio_test_block(async {
//! let store = InMemoryAuthorStore::new();
//! let author = store
//!     .create(NewAuthor {
//!         name: "Clarice Lispector".to_string(),
//!         date_of_birth: NaiveDate::from_ymd_opt(1920, 12, 10).unwrap(),
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(author.id, 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

mod error;
mod memory;
mod pagination;
#[cfg(feature = "database")]
mod postgres;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::InMemoryAuthorStore;
pub use pagination::{Page, Pagination};
#[cfg(feature = "database")]
pub use postgres::PgAuthorStore;
pub use traits::{AuthorStore, RepositoryResult, UniqueLookup};
