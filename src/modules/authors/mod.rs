//! Author reference-entity CRUD.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use folio_http::error::AppError;
use folio_kernel::{InitCtx, Module};
use folio_store::{Author, AuthorId, CatalogStore, MAX_NAME_LEN};

use crate::utils;

pub struct AuthorsModule {
    store: Arc<dyn CatalogStore>,
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_authors).post(create_author))
            .route(
                "/{id}",
                get(get_author).put(update_author).delete(delete_author),
            )
            .with_state(self.store.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorRequest {
    pub name: String,
    pub birth_year: i32,
}

async fn list_authors(
    State(store): State<Arc<dyn CatalogStore>>,
) -> Result<Json<Vec<Author>>, AppError> {
    let authors = store.list_authors().await.map_err(AppError::internal)?;
    Ok(Json(authors))
}

async fn get_author(
    State(store): State<Arc<dyn CatalogStore>>,
    Path(id): Path<AuthorId>,
) -> Result<Json<Author>, AppError> {
    store
        .get_author(id)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("author {id} not found")))
}

async fn create_author(
    State(store): State<Arc<dyn CatalogStore>>,
    Json(request): Json<AuthorRequest>,
) -> Result<(StatusCode, Json<Author>), AppError> {
    let name = utils::require_text("name", &request.name, MAX_NAME_LEN)?;
    let author = Author::new(name, request.birth_year);
    store
        .insert_author(author.clone())
        .await
        .map_err(AppError::internal)?;
    Ok((StatusCode::CREATED, Json(author)))
}

async fn update_author(
    State(store): State<Arc<dyn CatalogStore>>,
    Path(id): Path<AuthorId>,
    Json(request): Json<AuthorRequest>,
) -> Result<Json<Author>, AppError> {
    let name = utils::require_text("name", &request.name, MAX_NAME_LEN)?;
    store
        .update_author(id, name, request.birth_year)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("author {id} not found")))
}

async fn delete_author(
    State(store): State<Arc<dyn CatalogStore>>,
    Path(id): Path<AuthorId>,
) -> Result<StatusCode, AppError> {
    if store.delete_author(id).await.map_err(AppError::internal)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("author {id} not found")))
    }
}

/// Create a new instance of the authors module.
pub fn create_module(store: Arc<dyn CatalogStore>) -> Arc<dyn Module> {
    Arc::new(AuthorsModule { store })
}
