pub mod models;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::routing::{get, put};
use axum::Router;
use serde_json::json;

use folio_kernel::{InitCtx, Module};
use folio_store::CatalogStore;

use self::routes::BooksState;

/// Catalog surface: book CRUD plus the search and top-rated listings.
pub struct BooksModule {
    state: BooksState,
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            top_n = self.state.top_n,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list_books).post(routes::create_book))
            .route("/details", get(routes::list_books_detailed))
            .route("/top-10", get(routes::top_books))
            .route("/search", get(routes::search_books))
            .route(
                "/{id}",
                get(routes::get_book)
                    .put(routes::update_book_price)
                    .delete(routes::delete_book),
            )
            .route("/{id}/authors", put(routes::update_book_authors))
            .route("/{id}/genres", put(routes::update_book_genres))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/search": {
                    "get": {
                        "summary": "Search the catalog with optional filters",
                        "tags": ["Books"],
                        "parameters": [
                            {"name": "title", "in": "query", "schema": {"type": "string"}},
                            {"name": "author", "in": "query", "schema": {"type": "string"}},
                            {"name": "genre", "in": "query", "schema": {"type": "string"}},
                            {"name": "min_price", "in": "query", "schema": {"type": "number"}},
                            {"name": "max_price", "in": "query", "schema": {"type": "number"}},
                            {"name": "min_rating", "in": "query", "schema": {"type": "number"}}
                        ],
                        "responses": {
                            "200": {
                                "description": "Ranked results, best rated first",
                                "content": {"application/json": {"schema": {
                                    "type": "array",
                                    "items": {"$ref": "#/components/schemas/RankedBook"}
                                }}}
                            }
                        }
                    }
                },
                "/top-10": {
                    "get": {
                        "summary": "Top rated books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Highest-rated books, best first",
                                "content": {"application/json": {"schema": {
                                    "type": "array",
                                    "items": {"$ref": "#/components/schemas/RankedBook"}
                                }}}
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "RankedBook": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string", "format": "uuid"},
                            "title": {"type": "string"},
                            "price": {"type": "number"},
                            "author_names": {"type": "array", "items": {"type": "string"}},
                            "genre_names": {"type": "array", "items": {"type": "string"}},
                            "average_rating": {"type": "number"}
                        },
                        "required": ["id", "title", "price", "average_rating"]
                    }
                }
            }
        }))
    }
}

/// Create a new instance of the books module.
pub fn create_module(store: Arc<dyn CatalogStore>, top_n: usize) -> Arc<dyn Module> {
    Arc::new(BooksModule {
        state: BooksState { store, top_n },
    })
}
