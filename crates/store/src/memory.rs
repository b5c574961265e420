//! In-memory catalog engine.
//!
//! Keeps four id-keyed maps behind one `RwLock`; the import commit is a
//! single write-lock section, so a batch becomes visible to readers all at
//! once or not at all. The ranking procedure lives here, on the store side
//! of the [`CatalogStore`] contract, the same way a relational backend
//! would host it as a server-side query.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::catalog::{CatalogStore, ImportStore};
use crate::entities::{
    fold_key, Author, AuthorId, Book, BookId, Genre, GenreId, ImportBatch, Review, ReviewId,
};
use crate::error::StoreError;
use crate::query::{BookSearchQuery, RankedBook, ReviewRow};

#[derive(Default)]
struct Inner {
    books: HashMap<BookId, Book>,
    authors: HashMap<AuthorId, Author>,
    genres: HashMap<GenreId, Genre>,
    reviews: HashMap<ReviewId, Review>,
}

/// Round to 2 decimals, half away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Inner {
    /// Per-book (sum, count) over all reviews.
    fn rating_index(&self) -> HashMap<BookId, (u32, u32)> {
        let mut index: HashMap<BookId, (u32, u32)> = HashMap::new();
        for review in self.reviews.values() {
            let entry = index.entry(review.book_id).or_insert((0, 0));
            entry.0 += u32::from(review.rating);
            entry.1 += 1;
        }
        index
    }

    fn average_rating(ratings: &HashMap<BookId, (u32, u32)>, id: BookId) -> f64 {
        match ratings.get(&id) {
            Some((sum, count)) if *count > 0 => round2(f64::from(*sum) / f64::from(*count)),
            _ => 0.0,
        }
    }

    fn ranked_row(&self, book: &Book, average_rating: f64) -> RankedBook {
        let author_names = book
            .author_ids
            .iter()
            .filter_map(|id| self.authors.get(id).map(|a| a.name.clone()))
            .collect();
        let genre_names = book
            .genre_ids
            .iter()
            .filter_map(|id| self.genres.get(id).map(|g| g.name.clone()))
            .collect();
        RankedBook {
            id: book.id,
            title: book.title.clone(),
            price: book.price,
            author_names,
            genre_names,
            average_rating,
        }
    }

    /// Filter, aggregate, post-aggregate filter, then order by average
    /// rating descending with title-ascending tie-break.
    fn rank(&self, query: &BookSearchQuery) -> Vec<RankedBook> {
        let title_term = query.title.as_deref().map(str::to_lowercase);
        let author_term = query.author.as_deref().map(str::to_lowercase);
        let genre_term = query.genre.as_deref().map(str::to_lowercase);
        let ratings = self.rating_index();

        let mut rows = Vec::new();
        for book in self.books.values() {
            if let Some(term) = &title_term {
                if !book.title.to_lowercase().contains(term) {
                    continue;
                }
            }
            if let Some(min) = query.min_price {
                if book.price < min {
                    continue;
                }
            }
            if let Some(max) = query.max_price {
                if book.price > max {
                    continue;
                }
            }

            let row = self.ranked_row(book, Self::average_rating(&ratings, book.id));

            if let Some(term) = &author_term {
                if !row.author_names.iter().any(|n| n.to_lowercase().contains(term)) {
                    continue;
                }
            }
            if let Some(term) = &genre_term {
                if !row.genre_names.iter().any(|n| n.to_lowercase().contains(term)) {
                    continue;
                }
            }
            // HAVING-style: compares the rounded aggregate.
            if let Some(min) = query.min_rating {
                if row.average_rating < min {
                    continue;
                }
            }

            rows.push(row);
        }

        rows.sort_by(|a, b| {
            b.average_rating
                .partial_cmp(&a.average_rating)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.title.cmp(&b.title))
        });
        rows
    }

    fn review_row(&self, review: &Review) -> Option<ReviewRow> {
        let book = self.books.get(&review.book_id)?;
        Some(ReviewRow {
            id: review.id,
            description: review.description.clone(),
            rating: review.rating,
            book_id: review.book_id,
            book_title: book.title.clone(),
        })
    }
}

/// The reference [`CatalogStore`] engine.
#[derive(Default)]
pub struct MemoryCatalog {
    inner: RwLock<Inner>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImportStore for MemoryCatalog {
    async fn book_title_keys(&self) -> Result<HashSet<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.books.values().map(|b| fold_key(&b.title)).collect())
    }

    async fn authors_by_folded_names(
        &self,
        names: &HashSet<String>,
    ) -> Result<Vec<Author>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .authors
            .values()
            .filter(|a| names.contains(&fold_key(&a.name)))
            .cloned()
            .collect())
    }

    async fn genres_by_folded_names(
        &self,
        names: &HashSet<String>,
    ) -> Result<Vec<Genre>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .genres
            .values()
            .filter(|g| names.contains(&fold_key(&g.name)))
            .cloned()
            .collect())
    }

    async fn commit_import(&self, batch: ImportBatch) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        tracing::debug!(
            books = batch.books.len(),
            authors = batch.authors.len(),
            genres = batch.genres.len(),
            "committing import batch"
        );
        for author in batch.authors {
            inner.authors.insert(author.id, author);
        }
        for genre in batch.genres {
            inner.genres.insert(genre.id, genre);
        }
        for book in batch.books {
            inner.books.insert(book.id, book);
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        let inner = self.inner.read().await;
        let mut books: Vec<Book> = inner.books.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn list_books_detailed(&self) -> Result<Vec<RankedBook>, StoreError> {
        let inner = self.inner.read().await;
        let ratings = inner.rating_index();
        let mut rows: Vec<RankedBook> = inner
            .books
            .values()
            .map(|b| inner.ranked_row(b, Inner::average_rating(&ratings, b.id)))
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.books.get(&id).cloned())
    }

    async fn get_book_detailed(&self, id: BookId) -> Result<Option<RankedBook>, StoreError> {
        let inner = self.inner.read().await;
        let ratings = inner.rating_index();
        Ok(inner
            .books
            .get(&id)
            .map(|b| inner.ranked_row(b, Inner::average_rating(&ratings, id))))
    }

    async fn insert_book(&self, book: Book) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.books.insert(book.id, book);
        Ok(())
    }

    async fn update_book_price(
        &self,
        id: BookId,
        price: f32,
    ) -> Result<Option<RankedBook>, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.books.get_mut(&id) {
            Some(book) => book.price = price,
            None => return Ok(None),
        }
        let ratings = inner.rating_index();
        Ok(inner
            .books
            .get(&id)
            .map(|b| inner.ranked_row(b, Inner::average_rating(&ratings, id))))
    }

    async fn set_book_authors(
        &self,
        id: BookId,
        author_ids: Vec<AuthorId>,
    ) -> Result<Option<RankedBook>, StoreError> {
        let mut inner = self.inner.write().await;
        // Unknown ids are dropped, not an error.
        let mut resolved: Vec<AuthorId> = Vec::new();
        for author_id in author_ids {
            if inner.authors.contains_key(&author_id) && !resolved.contains(&author_id) {
                resolved.push(author_id);
            }
        }
        match inner.books.get_mut(&id) {
            Some(book) => book.author_ids = resolved,
            None => return Ok(None),
        }
        let ratings = inner.rating_index();
        Ok(inner
            .books
            .get(&id)
            .map(|b| inner.ranked_row(b, Inner::average_rating(&ratings, id))))
    }

    async fn set_book_genres(
        &self,
        id: BookId,
        genre_ids: Vec<GenreId>,
    ) -> Result<Option<RankedBook>, StoreError> {
        let mut inner = self.inner.write().await;
        let mut resolved: Vec<GenreId> = Vec::new();
        for genre_id in genre_ids {
            if inner.genres.contains_key(&genre_id) && !resolved.contains(&genre_id) {
                resolved.push(genre_id);
            }
        }
        match inner.books.get_mut(&id) {
            Some(book) => book.genre_ids = resolved,
            None => return Ok(None),
        }
        let ratings = inner.rating_index();
        Ok(inner
            .books
            .get(&id)
            .map(|b| inner.ranked_row(b, Inner::average_rating(&ratings, id))))
    }

    async fn delete_book(&self, id: BookId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.books.remove(&id).is_none() {
            return Ok(false);
        }
        inner.reviews.retain(|_, review| review.book_id != id);
        Ok(true)
    }

    async fn list_authors(&self) -> Result<Vec<Author>, StoreError> {
        let inner = self.inner.read().await;
        let mut authors: Vec<Author> = inner.authors.values().cloned().collect();
        authors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(authors)
    }

    async fn get_author(&self, id: AuthorId) -> Result<Option<Author>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.authors.get(&id).cloned())
    }

    async fn insert_author(&self, author: Author) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.authors.insert(author.id, author);
        Ok(())
    }

    async fn update_author(
        &self,
        id: AuthorId,
        name: String,
        birth_year: i32,
    ) -> Result<Option<Author>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.authors.get_mut(&id).map(|author| {
            author.name = name;
            author.birth_year = birth_year;
            author.clone()
        }))
    }

    async fn delete_author(&self, id: AuthorId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.authors.remove(&id).is_none() {
            return Ok(false);
        }
        for book in inner.books.values_mut() {
            book.author_ids.retain(|author_id| *author_id != id);
        }
        Ok(true)
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, StoreError> {
        let inner = self.inner.read().await;
        let mut genres: Vec<Genre> = inner.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn get_genre(&self, id: GenreId) -> Result<Option<Genre>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.genres.get(&id).cloned())
    }

    async fn insert_genre(&self, genre: Genre) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.genres.insert(genre.id, genre);
        Ok(())
    }

    async fn update_genre(&self, id: GenreId, name: String) -> Result<Option<Genre>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.genres.get_mut(&id).map(|genre| {
            genre.name = name;
            genre.clone()
        }))
    }

    async fn delete_genre(&self, id: GenreId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.genres.remove(&id).is_none() {
            return Ok(false);
        }
        for book in inner.books.values_mut() {
            book.genre_ids.retain(|genre_id| *genre_id != id);
        }
        Ok(true)
    }

    async fn list_reviews(&self) -> Result<Vec<ReviewRow>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<ReviewRow> = inner
            .reviews
            .values()
            .filter_map(|r| inner.review_row(r))
            .collect();
        rows.sort_by(|a, b| a.book_title.cmp(&b.book_title).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn get_review(&self, id: ReviewId) -> Result<Option<ReviewRow>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.reviews.get(&id).and_then(|r| inner.review_row(r)))
    }

    async fn insert_review(&self, review: Review) -> Result<Option<ReviewRow>, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.books.contains_key(&review.book_id) {
            return Ok(None);
        }
        let row = inner.review_row(&review);
        inner.reviews.insert(review.id, review);
        Ok(row)
    }

    async fn update_review(
        &self,
        id: ReviewId,
        description: Option<String>,
        rating: u8,
    ) -> Result<Option<ReviewRow>, StoreError> {
        let mut inner = self.inner.write().await;
        let review = match inner.reviews.get_mut(&id) {
            Some(review) => {
                review.description = description;
                review.rating = rating;
                review.clone()
            }
            None => return Ok(None),
        };
        Ok(inner.review_row(&review))
    }

    async fn delete_review(&self, id: ReviewId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.reviews.remove(&id).is_some())
    }

    async fn search_books(&self, query: &BookSearchQuery) -> Result<Vec<RankedBook>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.rank(query))
    }

    async fn top_books_by_rating(&self, limit: usize) -> Result<Vec<RankedBook>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows = inner.rank(&BookSearchQuery::default());
        rows.truncate(limit);
        Ok(rows)
    }
}
