//! In-process Data Store
//!
//! Keeps the `authors` and `books` tables in ordered maps behind a single
//! async lock. Ids come from monotonically increasing counters, so a deleted
//! id is never handed out again.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use super::error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
use super::pagination::{Page, Pagination};
use super::traits::{AuthorStore, RepositoryResult, UniqueLookup};
use crate::models::{Author, AuthorChanges, AuthorId, AuthorWithBooks, Book, BookId, NewAuthor};

#[derive(Debug)]
struct Tables {
    authors: BTreeMap<AuthorId, Author>,
    books: BTreeMap<BookId, Book>,
    next_author_id: AuthorId,
    next_book_id: BookId,
}

impl Tables {
    fn books_of(&self, author_id: AuthorId) -> Vec<Book> {
        self.books
            .values()
            .filter(|book| book.author_id == author_id)
            .cloned()
            .collect()
    }

    fn with_books(&self, author: &Author) -> AuthorWithBooks {
        AuthorWithBooks::new(author.clone(), self.books_of(author.id))
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            authors: BTreeMap::new(),
            books: BTreeMap::new(),
            next_author_id: 1,
            next_book_id: 1,
        }
    }
}

/// Author store held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryAuthorStore {
    tables: RwLock<Tables>,
}

impl InMemoryAuthorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a book to an existing author
    ///
    /// Books have no HTTP surface; this is how they get seeded.
    pub async fn insert_book(
        &self,
        author_id: AuthorId,
        title: impl Into<String>,
        publication_year: i32,
    ) -> RepositoryResult<Book> {
        let mut tables = self.tables.write().await;
        if !tables.authors.contains_key(&author_id) {
            return Err(RepositoryError::constraint_violation(
                RepositoryOperation::Create,
                "books.author_id references a missing author",
            )
            .with_entity("Author", author_id.to_string()));
        }

        let id = tables.next_book_id;
        tables.next_book_id += 1;
        let book = Book {
            id,
            title: title.into(),
            publication_year,
            author_id,
        };
        tables.books.insert(id, book.clone());
        Ok(book)
    }

    /// Number of stored books across all authors
    pub async fn book_count(&self) -> usize {
        self.tables.read().await.books.len()
    }
}

impl UniqueLookup for InMemoryAuthorStore {
    async fn value_exists(&self, table: &str, column: &str, value: &str) -> RepositoryResult<bool> {
        let tables = self.tables.read().await;
        match (table, column) {
            ("authors", "name") => Ok(tables.authors.values().any(|a| a.name == value)),
            _ => Err(RepositoryError::new(
                RepositoryOperation::Exists,
                RepositoryErrorKind::Other,
                format!("no such column: {}.{}", table, column),
            )),
        }
    }
}

impl AuthorStore for InMemoryAuthorStore {
    async fn paginate(&self, pagination: Pagination) -> RepositoryResult<Page<AuthorWithBooks>> {
        let tables = self.tables.read().await;
        let offset = usize::try_from(pagination.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);

        let items = tables
            .authors
            .values()
            .skip(offset)
            .take(limit)
            .map(|author| tables.with_books(author))
            .collect();

        Ok(Page::new(items, tables.authors.len() as u64))
    }

    async fn find_by_id(&self, id: AuthorId) -> RepositoryResult<Option<Author>> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn find_by_id_with_relations(
        &self,
        id: AuthorId,
    ) -> RepositoryResult<Option<AuthorWithBooks>> {
        let tables = self.tables.read().await;
        Ok(tables.authors.get(&id).map(|author| tables.with_books(author)))
    }

    async fn find_all_with_relations(&self) -> RepositoryResult<Vec<AuthorWithBooks>> {
        let tables = self.tables.read().await;
        Ok(tables
            .authors
            .values()
            .map(|author| tables.with_books(author))
            .collect())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.tables.read().await.authors.len() as u64)
    }

    async fn create(&self, data: NewAuthor) -> RepositoryResult<Author> {
        let mut tables = self.tables.write().await;
        if tables.authors.values().any(|a| a.name == data.name) {
            return Err(RepositoryError::already_exists("Author", data.name));
        }

        let id = tables.next_author_id;
        tables.next_author_id += 1;
        let author = Author {
            id,
            name: data.name,
            date_of_birth: data.date_of_birth,
        };
        tables.authors.insert(id, author.clone());
        Ok(author)
    }

    async fn update_fields(&self, id: AuthorId, changes: AuthorChanges) -> RepositoryResult<Author> {
        let mut tables = self.tables.write().await;

        if let Some(name) = &changes.name {
            let taken = tables
                .authors
                .values()
                .any(|a| a.id != id && &a.name == name);
            if taken {
                return Err(RepositoryError::already_exists("Author", name.clone())
                    .with_operation(RepositoryOperation::Update));
            }
        }

        let author = tables.authors.get_mut(&id).ok_or_else(|| {
            RepositoryError::not_found("Author", id.to_string())
                .with_operation(RepositoryOperation::Update)
        })?;
        changes.apply_to(author);
        Ok(author.clone())
    }

    async fn delete(&self, id: AuthorId) -> RepositoryResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.authors.remove(&id).is_none() {
            return Ok(false);
        }
        tables.books.retain(|_, book| book.author_id != id);
        Ok(true)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_author(name: &str) -> NewAuthor {
        NewAuthor {
            name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = InMemoryAuthorStore::new();
        let first = store.create(new_author("A")).await.unwrap();
        let second = store.create(new_author("B")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = InMemoryAuthorStore::new();
        let first = store.create(new_author("A")).await.unwrap();
        assert!(store.delete(first.id).await.unwrap());
        let next = store.create(new_author("B")).await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let store = InMemoryAuthorStore::new();
        store.create(new_author("A")).await.unwrap();
        let err = store.create(new_author("A")).await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_relations_are_loaded_per_author() {
        let store = InMemoryAuthorStore::new();
        let a = store.create(new_author("A")).await.unwrap();
        let b = store.create(new_author("B")).await.unwrap();
        store.insert_book(a.id, "First", 1901).await.unwrap();
        store.insert_book(b.id, "Second", 1902).await.unwrap();
        store.insert_book(a.id, "Third", 1903).await.unwrap();

        let loaded = store.find_by_id_with_relations(a.id).await.unwrap().unwrap();
        let titles: Vec<_> = loaded.books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["First", "Third"]);

        let all = store.find_all_with_relations().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].books.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_book_requires_author() {
        let store = InMemoryAuthorStore::new();
        let err = store.insert_book(99, "Orphan", 2000).await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::ConstraintViolation);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_books() {
        let store = InMemoryAuthorStore::new();
        let a = store.create(new_author("A")).await.unwrap();
        let b = store.create(new_author("B")).await.unwrap();
        store.insert_book(a.id, "Gone", 1901).await.unwrap();
        store.insert_book(b.id, "Kept", 1902).await.unwrap();

        assert!(store.delete(a.id).await.unwrap());
        assert_eq!(store.book_count().await, 1);
        assert!(!store.delete(a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_fields_partial() {
        let store = InMemoryAuthorStore::new();
        let a = store.create(new_author("A")).await.unwrap();
        let updated = store
            .update_fields(
                a.id,
                AuthorChanges {
                    name: Some("Renamed".to_string()),
                    date_of_birth: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.date_of_birth, a.date_of_birth);
    }

    #[tokio::test]
    async fn test_update_missing_author() {
        let store = InMemoryAuthorStore::new();
        let err = store
            .update_fields(5, AuthorChanges::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::NotFound);
        assert_eq!(err.operation, RepositoryOperation::Update);
    }

    #[tokio::test]
    async fn test_paginate_slices_in_id_order() {
        let store = InMemoryAuthorStore::new();
        for name in ["A", "B", "C"] {
            store.create(new_author(name)).await.unwrap();
        }

        let page = store.paginate(Pagination::page(2, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].author.name, "C");

        let beyond = store.paginate(Pagination::page(5, 2)).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_value_exists() {
        let store = InMemoryAuthorStore::new();
        store.create(new_author("Taken")).await.unwrap();
        assert!(store.value_exists("authors", "name", "Taken").await.unwrap());
        assert!(!store.value_exists("authors", "name", "Free").await.unwrap());
        assert!(store.value_exists("authors", "secret", "x").await.is_err());
    }
}
