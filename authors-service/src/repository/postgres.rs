//! PostgreSQL Data Store backed by sqlx
//!
//! Relations are loaded with one extra query per call (`author_id = ANY($1)`)
//! rather than one per author.

use std::collections::HashMap;

use sqlx::PgPool;

use super::error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
use super::pagination::{Page, Pagination};
use super::traits::{AuthorStore, RepositoryResult, UniqueLookup};
use crate::models::{Author, AuthorChanges, AuthorId, AuthorWithBooks, Book, NewAuthor};

const AUTHOR_COLUMNS: &str = "id, name, date_of_birth";

/// Author store persisting to PostgreSQL
#[derive(Debug, Clone)]
pub struct PgAuthorStore {
    pool: PgPool,
}

impl PgAuthorStore {
    /// Wrap an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_books(&self, authors: Vec<Author>) -> RepositoryResult<Vec<AuthorWithBooks>> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<AuthorId> = authors.iter().map(|a| a.id).collect();
        let books: Vec<Book> = sqlx::query_as(
            "SELECT id, title, publication_year, author_id FROM books \
             WHERE author_id = ANY($1) ORDER BY id",
        )
        .bind(ids.as_slice())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(RepositoryOperation::BatchLoad, e))?;

        let mut by_author: HashMap<AuthorId, Vec<Book>> = HashMap::new();
        for book in books {
            by_author.entry(book.author_id).or_default().push(book);
        }

        Ok(authors
            .into_iter()
            .map(|author| {
                let books = by_author.remove(&author.id).unwrap_or_default();
                AuthorWithBooks::new(author, books)
            })
            .collect())
    }
}

/// Translate a sqlx failure into a repository error
fn map_sqlx_error(operation: RepositoryOperation, err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => RepositoryError::new(
            operation,
            RepositoryErrorKind::AlreadyExists,
            db_err.message().to_string(),
        ),
        sqlx::Error::Database(db_err)
            if db_err.is_foreign_key_violation() || db_err.is_check_violation() =>
        {
            RepositoryError::constraint_violation(operation, db_err.message().to_string())
        }
        sqlx::Error::PoolTimedOut => RepositoryError::timeout(operation, err.to_string()),
        sqlx::Error::Io(_) | sqlx::Error::PoolClosed | sqlx::Error::Tls(_) => {
            RepositoryError::connection_failed(err.to_string()).with_operation(operation)
        }
        _ => RepositoryError::database_error(operation, err.to_string()),
    }
}

impl UniqueLookup for PgAuthorStore {
    async fn value_exists(&self, table: &str, column: &str, value: &str) -> RepositoryResult<bool> {
        let query = match (table, column) {
            ("authors", "name") => "SELECT EXISTS(SELECT 1 FROM authors WHERE name = $1)",
            _ => {
                return Err(RepositoryError::new(
                    RepositoryOperation::Exists,
                    RepositoryErrorKind::Other,
                    format!("no such column: {}.{}", table, column),
                ))
            }
        };

        sqlx::query_scalar::<_, bool>(query)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(RepositoryOperation::Exists, e))
    }
}

impl AuthorStore for PgAuthorStore {
    async fn paginate(&self, pagination: Pagination) -> RepositoryResult<Page<AuthorWithBooks>> {
        let total = self.count().await?;
        let limit = i64::try_from(pagination.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(pagination.offset).unwrap_or(i64::MAX);

        let authors: Vec<Author> = sqlx::query_as(&format!(
            "SELECT {} FROM authors ORDER BY id LIMIT $1 OFFSET $2",
            AUTHOR_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(RepositoryOperation::Paginate, e))?;

        Ok(Page::new(self.load_books(authors).await?, total))
    }

    async fn find_by_id(&self, id: AuthorId) -> RepositoryResult<Option<Author>> {
        sqlx::query_as(&format!(
            "SELECT {} FROM authors WHERE id = $1",
            AUTHOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(RepositoryOperation::FindById, e))
    }

    async fn find_by_id_with_relations(
        &self,
        id: AuthorId,
    ) -> RepositoryResult<Option<AuthorWithBooks>> {
        let Some(author) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        Ok(self.load_books(vec![author]).await?.pop())
    }

    async fn find_all_with_relations(&self) -> RepositoryResult<Vec<AuthorWithBooks>> {
        let authors: Vec<Author> = sqlx::query_as(&format!(
            "SELECT {} FROM authors ORDER BY id",
            AUTHOR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(RepositoryOperation::FindAll, e))?;

        self.load_books(authors).await
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(RepositoryOperation::Count, e))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn create(&self, data: NewAuthor) -> RepositoryResult<Author> {
        sqlx::query_as(&format!(
            "INSERT INTO authors (name, date_of_birth) VALUES ($1, $2) RETURNING {}",
            AUTHOR_COLUMNS
        ))
        .bind(data.name)
        .bind(data.date_of_birth)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(RepositoryOperation::Create, e))
    }

    async fn update_fields(&self, id: AuthorId, changes: AuthorChanges) -> RepositoryResult<Author> {
        let updated: Option<Author> = sqlx::query_as(&format!(
            "UPDATE authors SET \
                name = COALESCE($2, name), \
                date_of_birth = COALESCE($3, date_of_birth), \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            AUTHOR_COLUMNS
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.date_of_birth)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(RepositoryOperation::Update, e))?;

        updated.ok_or_else(|| {
            RepositoryError::not_found("Author", id.to_string())
                .with_operation(RepositoryOperation::Update)
        })
    }

    async fn delete(&self, id: AuthorId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(RepositoryOperation::Delete, e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(RepositoryOperation::HealthCheck, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_maps_to_retriable() {
        let err = map_sqlx_error(RepositoryOperation::FindAll, sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind, RepositoryErrorKind::Timeout);
        assert_eq!(err.operation, RepositoryOperation::FindAll);
        assert!(err.is_retriable());
    }

    #[test]
    fn test_pool_closed_maps_to_connection_failed() {
        let err = map_sqlx_error(RepositoryOperation::Delete, sqlx::Error::PoolClosed);
        assert_eq!(err.kind, RepositoryErrorKind::ConnectionFailed);
        assert_eq!(err.operation, RepositoryOperation::Delete);
    }

    #[test]
    fn test_other_errors_map_to_database_error() {
        let err = map_sqlx_error(RepositoryOperation::Count, sqlx::Error::RowNotFound);
        assert_eq!(err.kind, RepositoryErrorKind::DatabaseError);
    }
}
