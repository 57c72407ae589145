//! Domain records for the authors resource
//!
//! [`Author`] is the persisted record. [`AuthorWithBooks`] is the same record
//! with its `books` relation eagerly loaded, which is what list, show and
//! update respond with. Create responds with a bare [`Author`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Author primary key, assigned by the Data Store
pub type AuthorId = i64;

/// Book primary key
pub type BookId = i64;

/// A persisted author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    /// Serialized as `YYYY-MM-DD`
    pub date_of_birth: NaiveDate,
}

/// A book belonging to an author
///
/// Books are only ever read through their author; the foreign key stays
/// out of the JSON representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub publication_year: i32,
    #[serde(skip_serializing, default)]
    pub author_id: AuthorId,
}

/// An author together with all of its books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorWithBooks {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<Book>,
}

impl AuthorWithBooks {
    pub fn new(author: Author, books: Vec<Book>) -> Self {
        Self { author, books }
    }
}

/// Fields required to create an author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub date_of_birth: NaiveDate,
}

/// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorChanges {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl AuthorChanges {
    /// Check if the update carries any change
    pub fn has_updates(&self) -> bool {
        self.name.is_some() || self.date_of_birth.is_some()
    }

    /// Apply the changes onto an existing record
    pub fn apply_to(self, author: &mut Author) {
        if let Some(name) = self.name {
            author.name = name;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            author.date_of_birth = date_of_birth;
        }
    }
}
