//! Persisted entity types and the identity rules shared with the importer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BookId = Uuid;
pub type AuthorId = Uuid;
pub type GenreId = Uuid;
pub type ReviewId = Uuid;

/// Longest accepted book title.
pub const MAX_TITLE_LEN: usize = 200;
/// Longest accepted author or genre name.
pub const MAX_NAME_LEN: usize = 100;

/// Identity key used for import-time matching: titles and reference-entity
/// names are equal when their trimmed, case-folded forms are equal.
pub fn fold_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A catalog entry. Relations to authors and genres are id sets resolved
/// through the store, never embedded references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub price: f32,
    pub author_ids: Vec<AuthorId>,
    pub genre_ids: Vec<GenreId>,
}

impl Book {
    pub fn new(title: impl Into<String>, price: f32) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            price,
            author_ids: Vec::new(),
            genre_ids: Vec::new(),
        }
    }
}

/// Shared by any number of books; holds no back-reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub birth_year: i32,
}

impl Author {
    pub fn new(name: impl Into<String>, birth_year: i32) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            birth_year,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
        }
    }
}

/// Owned by exactly one book; deleting the book deletes its reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub description: Option<String>,
    /// Always within 1..=5; enforced at the HTTP boundary.
    pub rating: u8,
    pub book_id: BookId,
}

impl Review {
    pub fn new(book_id: BookId, description: Option<String>, rating: u8) -> Self {
        Self {
            id: Uuid::now_v7(),
            description,
            rating,
            book_id,
        }
    }
}

/// Everything one import run adds, committed as a single unit.
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub books: Vec<Book>,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

impl ImportBatch {
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.authors.is_empty() && self.genres.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_key_trims_and_lowercases() {
        assert_eq!(fold_key("  The Great Adventure "), "the great adventure");
        assert_eq!(fold_key("DUNE"), fold_key(" dune "));
    }

    #[test]
    fn new_entities_get_distinct_ids() {
        let a = Author::new("Jane Doe", 1970);
        let b = Author::new("Jane Doe", 1970);
        assert_ne!(a.id, b.id);
    }
}
