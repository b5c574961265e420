//! Genre reference-entity CRUD.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use folio_http::error::AppError;
use folio_kernel::{InitCtx, Module};
use folio_store::{CatalogStore, Genre, GenreId, MAX_NAME_LEN};

use crate::utils;

pub struct GenresModule {
    store: Arc<dyn CatalogStore>,
}

#[async_trait]
impl Module for GenresModule {
    fn name(&self) -> &'static str {
        "genres"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "genres module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_genres).post(create_genre))
            .route(
                "/{id}",
                get(get_genre).put(update_genre).delete(delete_genre),
            )
            .with_state(self.store.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreRequest {
    pub name: String,
}

async fn list_genres(
    State(store): State<Arc<dyn CatalogStore>>,
) -> Result<Json<Vec<Genre>>, AppError> {
    let genres = store.list_genres().await.map_err(AppError::internal)?;
    Ok(Json(genres))
}

async fn get_genre(
    State(store): State<Arc<dyn CatalogStore>>,
    Path(id): Path<GenreId>,
) -> Result<Json<Genre>, AppError> {
    store
        .get_genre(id)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("genre {id} not found")))
}

async fn create_genre(
    State(store): State<Arc<dyn CatalogStore>>,
    Json(request): Json<GenreRequest>,
) -> Result<(StatusCode, Json<Genre>), AppError> {
    let name = utils::require_text("name", &request.name, MAX_NAME_LEN)?;
    let genre = Genre::new(name);
    store
        .insert_genre(genre.clone())
        .await
        .map_err(AppError::internal)?;
    Ok((StatusCode::CREATED, Json(genre)))
}

async fn update_genre(
    State(store): State<Arc<dyn CatalogStore>>,
    Path(id): Path<GenreId>,
    Json(request): Json<GenreRequest>,
) -> Result<Json<Genre>, AppError> {
    let name = utils::require_text("name", &request.name, MAX_NAME_LEN)?;
    store
        .update_genre(id, name)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("genre {id} not found")))
}

async fn delete_genre(
    State(store): State<Arc<dyn CatalogStore>>,
    Path(id): Path<GenreId>,
) -> Result<StatusCode, AppError> {
    if store.delete_genre(id).await.map_err(AppError::internal)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("genre {id} not found")))
    }
}

/// Create a new instance of the genres module.
pub fn create_module(store: Arc<dyn CatalogStore>) -> Arc<dyn Module> {
    Arc::new(GenresModule { store })
}
