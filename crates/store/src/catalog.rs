//! Data-access contracts consumed by the import pipeline and the HTTP
//! modules.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::entities::{Author, AuthorId, Book, BookId, Genre, GenreId, ImportBatch, Review, ReviewId};
use crate::error::StoreError;
use crate::query::{BookSearchQuery, RankedBook, ReviewRow};

/// The narrow store surface the import pipeline depends on.
#[async_trait]
pub trait ImportStore: Send + Sync {
    /// Folded, trimmed titles of every book currently in the catalog.
    async fn book_title_keys(&self) -> Result<HashSet<String>, StoreError>;

    /// Authors whose folded name is in `names`.
    async fn authors_by_folded_names(
        &self,
        names: &HashSet<String>,
    ) -> Result<Vec<Author>, StoreError>;

    /// Genres whose folded name is in `names`.
    async fn genres_by_folded_names(
        &self,
        names: &HashSet<String>,
    ) -> Result<Vec<Genre>, StoreError>;

    /// Insert the batch as one unit. Readers never observe a partial batch.
    async fn commit_import(&self, batch: ImportBatch) -> Result<(), StoreError>;
}

/// Full catalog contract: CRUD plus the ranking procedure of the search
/// engine. Read paths perform no writes.
#[async_trait]
pub trait CatalogStore: ImportStore {
    async fn list_books(&self) -> Result<Vec<Book>, StoreError>;
    async fn list_books_detailed(&self) -> Result<Vec<RankedBook>, StoreError>;
    async fn get_book(&self, id: BookId) -> Result<Option<Book>, StoreError>;
    async fn get_book_detailed(&self, id: BookId) -> Result<Option<RankedBook>, StoreError>;
    async fn insert_book(&self, book: Book) -> Result<(), StoreError>;
    async fn update_book_price(
        &self,
        id: BookId,
        price: f32,
    ) -> Result<Option<RankedBook>, StoreError>;
    async fn set_book_authors(
        &self,
        id: BookId,
        author_ids: Vec<AuthorId>,
    ) -> Result<Option<RankedBook>, StoreError>;
    async fn set_book_genres(
        &self,
        id: BookId,
        genre_ids: Vec<GenreId>,
    ) -> Result<Option<RankedBook>, StoreError>;
    /// Deletes the book and, with it, its reviews.
    async fn delete_book(&self, id: BookId) -> Result<bool, StoreError>;

    async fn list_authors(&self) -> Result<Vec<Author>, StoreError>;
    async fn get_author(&self, id: AuthorId) -> Result<Option<Author>, StoreError>;
    async fn insert_author(&self, author: Author) -> Result<(), StoreError>;
    async fn update_author(
        &self,
        id: AuthorId,
        name: String,
        birth_year: i32,
    ) -> Result<Option<Author>, StoreError>;
    async fn delete_author(&self, id: AuthorId) -> Result<bool, StoreError>;

    async fn list_genres(&self) -> Result<Vec<Genre>, StoreError>;
    async fn get_genre(&self, id: GenreId) -> Result<Option<Genre>, StoreError>;
    async fn insert_genre(&self, genre: Genre) -> Result<(), StoreError>;
    async fn update_genre(&self, id: GenreId, name: String) -> Result<Option<Genre>, StoreError>;
    async fn delete_genre(&self, id: GenreId) -> Result<bool, StoreError>;

    async fn list_reviews(&self) -> Result<Vec<ReviewRow>, StoreError>;
    async fn get_review(&self, id: ReviewId) -> Result<Option<ReviewRow>, StoreError>;
    /// Returns `None` when the target book does not exist.
    async fn insert_review(&self, review: Review) -> Result<Option<ReviewRow>, StoreError>;
    async fn update_review(
        &self,
        id: ReviewId,
        description: Option<String>,
        rating: u8,
    ) -> Result<Option<ReviewRow>, StoreError>;
    async fn delete_review(&self, id: ReviewId) -> Result<bool, StoreError>;

    /// The server-side ranking/filter procedure: applies the query's
    /// filters, aggregates average ratings, and orders by rating descending
    /// with title-ascending tie-break.
    async fn search_books(&self, query: &BookSearchQuery) -> Result<Vec<RankedBook>, StoreError>;

    /// Full ranking with no filters, truncated to `limit` after ordering.
    async fn top_books_by_rating(&self, limit: usize) -> Result<Vec<RankedBook>, StoreError>;
}
