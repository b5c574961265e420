use serde::{Deserialize, Serialize};

use folio_store::{AuthorId, Book, BookId, GenreId};

/// Brief catalog row.
#[derive(Debug, Clone, Serialize)]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub price: f32,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            price: book.price,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub price: f32,
    #[serde(default)]
    pub author_ids: Vec<AuthorId>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookPriceRequest {
    pub price: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookAuthorsRequest {
    pub author_ids: Vec<AuthorId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookGenresRequest {
    pub genre_ids: Vec<GenreId>,
}
