//! Review CRUD. Ratings are validated here, at the boundary; out-of-range
//! values never reach the store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use folio_http::error::AppError;
use folio_kernel::{InitCtx, Module};
use folio_store::{BookId, CatalogStore, Review, ReviewId, ReviewRow};

use crate::utils;

pub struct ReviewsModule {
    store: Arc<dyn CatalogStore>,
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_reviews).post(create_review))
            .route(
                "/{id}",
                get(get_review).put(update_review).delete(delete_review),
            )
            .with_state(self.store.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub description: Option<String>,
    pub rating: u8,
    pub book_id: BookId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReviewRequest {
    pub description: Option<String>,
    pub rating: u8,
}

async fn list_reviews(
    State(store): State<Arc<dyn CatalogStore>>,
) -> Result<Json<Vec<ReviewRow>>, AppError> {
    let rows = store.list_reviews().await.map_err(AppError::internal)?;
    Ok(Json(rows))
}

async fn get_review(
    State(store): State<Arc<dyn CatalogStore>>,
    Path(id): Path<ReviewId>,
) -> Result<Json<ReviewRow>, AppError> {
    store
        .get_review(id)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("review {id} not found")))
}

async fn create_review(
    State(store): State<Arc<dyn CatalogStore>>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewRow>), AppError> {
    utils::require_rating(request.rating)?;
    let review = Review::new(request.book_id, request.description, request.rating);
    let row = store
        .insert_review(review)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(format!("book {} not found", request.book_id)))?;
    Ok((StatusCode::CREATED, Json(row)))
}

async fn update_review(
    State(store): State<Arc<dyn CatalogStore>>,
    Path(id): Path<ReviewId>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewRow>, AppError> {
    utils::require_rating(request.rating)?;
    store
        .update_review(id, request.description, request.rating)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("review {id} not found")))
}

async fn delete_review(
    State(store): State<Arc<dyn CatalogStore>>,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode, AppError> {
    if store.delete_review(id).await.map_err(AppError::internal)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("review {id} not found")))
    }
}

/// Create a new instance of the reviews module.
pub fn create_module(store: Arc<dyn CatalogStore>) -> Arc<dyn Module> {
    Arc::new(ReviewsModule { store })
}
