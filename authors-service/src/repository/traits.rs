//! Data Store trait definitions
//!
//! Async methods use RPITIT (Return Position Impl Trait In Traits) so
//! implementations can be written with plain `async fn` and no `async_trait`.
//! Every returned future is `Send`, which lets axum handlers stay generic over
//! the store.

use std::future::Future;

use super::error::RepositoryError;
use super::pagination::{Page, Pagination};
use crate::models::{Author, AuthorChanges, AuthorId, AuthorWithBooks, NewAuthor};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Existence check used by the `unique` validation rule
///
/// `table` and `column` name a stored attribute. Implementations reject
/// pairs they do not hold instead of interpolating them into a query.
pub trait UniqueLookup: Send + Sync {
    /// Returns true when some row already stores `value` in `table.column`
    fn value_exists(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> impl Future<Output = RepositoryResult<bool>> + Send;
}

/// Persistence contract for authors and their books
///
/// Author ids are assigned by the store, are positive and never reused
/// within one store. Deleting an author removes its books.
///
/// # Example
///
/// ```rust,ignore
/// use authors_service::repository::{AuthorStore, RepositoryResult};
///
/// async fn names<S: AuthorStore>(store: &S) -> RepositoryResult<Vec<String>> {
///     let all = store.find_all_with_relations().await?;
///     Ok(all.into_iter().map(|a| a.author.name).collect())
/// }
/// ```
pub trait AuthorStore: UniqueLookup {
    /// One page of authors ordered by id, each with its books
    fn paginate(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = RepositoryResult<Page<AuthorWithBooks>>> + Send;

    /// Find an author without loading relations
    fn find_by_id(
        &self,
        id: AuthorId,
    ) -> impl Future<Output = RepositoryResult<Option<Author>>> + Send;

    /// Find an author with its books eagerly loaded
    fn find_by_id_with_relations(
        &self,
        id: AuthorId,
    ) -> impl Future<Output = RepositoryResult<Option<AuthorWithBooks>>> + Send;

    /// Every author ordered by id, each with its books
    fn find_all_with_relations(
        &self,
    ) -> impl Future<Output = RepositoryResult<Vec<AuthorWithBooks>>> + Send;

    /// Number of stored authors
    fn count(&self) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Persist a new author and return it with its assigned id
    fn create(&self, data: NewAuthor) -> impl Future<Output = RepositoryResult<Author>> + Send;

    /// Overwrite the fields present in `changes`
    ///
    /// Fails with a `NotFound` error when no author has `id`.
    fn update_fields(
        &self,
        id: AuthorId,
        changes: AuthorChanges,
    ) -> impl Future<Output = RepositoryResult<Author>> + Send;

    /// Delete an author and its books; returns false when nothing was deleted
    fn delete(&self, id: AuthorId) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Probe the backend for readiness
    fn health_check(&self) -> impl Future<Output = RepositoryResult<()>> + Send;
}
