use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use folio_http::error::AppError;
use folio_store::{Book, BookId, BookSearchQuery, CatalogStore, RankedBook, MAX_TITLE_LEN};

use super::models::{
    BookResponse, CreateBookRequest, UpdateBookAuthorsRequest, UpdateBookGenresRequest,
    UpdateBookPriceRequest,
};
use crate::utils;

#[derive(Clone)]
pub(crate) struct BooksState {
    pub(crate) store: Arc<dyn CatalogStore>,
    pub(crate) top_n: usize,
}

pub(crate) async fn list_books(
    State(state): State<BooksState>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    let books = state.store.list_books().await.map_err(AppError::internal)?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

pub(crate) async fn list_books_detailed(
    State(state): State<BooksState>,
) -> Result<Json<Vec<RankedBook>>, AppError> {
    let rows = state
        .store
        .list_books_detailed()
        .await
        .map_err(AppError::internal)?;
    Ok(Json(rows))
}

pub(crate) async fn top_books(
    State(state): State<BooksState>,
) -> Result<Json<Vec<RankedBook>>, AppError> {
    let rows = state
        .store
        .top_books_by_rating(state.top_n)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(rows))
}

pub(crate) async fn search_books(
    State(state): State<BooksState>,
    Query(query): Query<BookSearchQuery>,
) -> Result<Json<Vec<RankedBook>>, AppError> {
    let rows = state
        .store
        .search_books(&query)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(rows))
}

pub(crate) async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<BookId>,
) -> Result<Json<RankedBook>, AppError> {
    state
        .store
        .get_book_detailed(id)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("book {id} not found")))
}

pub(crate) async fn create_book(
    State(state): State<BooksState>,
    Json(request): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<RankedBook>), AppError> {
    let title = utils::require_text("title", &request.title, MAX_TITLE_LEN)?;
    utils::require_non_negative("price", request.price)?;

    let mut book = Book::new(title, request.price);
    // Unknown relation ids are dropped, never an error.
    for author_id in request.author_ids {
        let known = state
            .store
            .get_author(author_id)
            .await
            .map_err(AppError::internal)?
            .is_some();
        if known && !book.author_ids.contains(&author_id) {
            book.author_ids.push(author_id);
        }
    }
    for genre_id in request.genre_ids {
        let known = state
            .store
            .get_genre(genre_id)
            .await
            .map_err(AppError::internal)?
            .is_some();
        if known && !book.genre_ids.contains(&genre_id) {
            book.genre_ids.push(genre_id);
        }
    }

    let id = book.id;
    state
        .store
        .insert_book(book)
        .await
        .map_err(AppError::internal)?;
    let detail = state
        .store
        .get_book_detailed(id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::internal(anyhow::anyhow!("book missing after insert")))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

pub(crate) async fn update_book_price(
    State(state): State<BooksState>,
    Path(id): Path<BookId>,
    Json(request): Json<UpdateBookPriceRequest>,
) -> Result<Json<RankedBook>, AppError> {
    utils::require_non_negative("price", request.price)?;
    state
        .store
        .update_book_price(id, request.price)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("book {id} not found")))
}

pub(crate) async fn update_book_authors(
    State(state): State<BooksState>,
    Path(id): Path<BookId>,
    Json(request): Json<UpdateBookAuthorsRequest>,
) -> Result<Json<RankedBook>, AppError> {
    state
        .store
        .set_book_authors(id, request.author_ids)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("book {id} not found")))
}

pub(crate) async fn update_book_genres(
    State(state): State<BooksState>,
    Path(id): Path<BookId>,
    Json(request): Json<UpdateBookGenresRequest>,
) -> Result<Json<RankedBook>, AppError> {
    state
        .store
        .set_book_genres(id, request.genre_ids)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("book {id} not found")))
}

pub(crate) async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<BookId>,
) -> Result<StatusCode, AppError> {
    if state
        .store
        .delete_book(id)
        .await
        .map_err(AppError::internal)?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("book {id} not found")))
    }
}
