//! Query inputs and projection rows returned by the store's read paths.

use serde::{Deserialize, Serialize};

use crate::entities::{BookId, ReviewId};

/// Filter set for the ranking query. Every field is optional; present
/// filters combine with logical AND. `min_rating` applies to the rounded
/// aggregate, after aggregation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookSearchQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub min_price: Option<f32>,
    pub max_price: Option<f32>,
    pub min_rating: Option<f64>,
}

/// Aggregate-annotated row produced by the ranking procedure and the
/// detailed read paths. Name sets are unordered.
#[derive(Debug, Clone, Serialize)]
pub struct RankedBook {
    pub id: BookId,
    pub title: String,
    pub price: f32,
    pub author_names: Vec<String>,
    pub genre_names: Vec<String>,
    /// Mean of the book's review ratings rounded to 2 decimals; 0 when the
    /// book has no reviews.
    pub average_rating: f64,
}

/// Review joined with its owning book's title.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRow {
    pub id: ReviewId,
    pub description: Option<String>,
    pub rating: u8,
    pub book_id: BookId,
    pub book_title: String,
}
