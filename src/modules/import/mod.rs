//! Scheduled catalog import: the pipeline, its single-flight runner, the
//! interval scheduler, and the manual trigger endpoint.

pub mod feed;
pub mod pipeline;
pub mod resolver;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;

use folio_http::error::AppError;
use folio_kernel::{InitCtx, Module};
use folio_store::ImportStore;

use self::feed::BookFeed;
use self::pipeline::{ImportError, ImportPipeline};

/// One import run at a time, whether the scheduler or the manual trigger
/// asks. A run either proceeds or is reported busy; the pipeline itself is
/// stateless between runs.
pub struct ImportRunner {
    pipeline: ImportPipeline,
    gate: Mutex<()>,
}

impl ImportRunner {
    pub fn new(pipeline: ImportPipeline) -> Self {
        Self {
            pipeline,
            gate: Mutex::new(()),
        }
    }

    /// `None` when a run is already in flight.
    pub async fn try_run(&self) -> Option<Result<u32, ImportError>> {
        let _guard = self.gate.try_lock().ok()?;
        Some(self.pipeline.import_books().await)
    }
}

pub struct ImportModule {
    runner: Arc<ImportRunner>,
    interval_secs: u64,
}

#[async_trait]
impl Module for ImportModule {
    fn name(&self) -> &'static str {
        "import"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            interval_secs = self.interval_secs,
            "import module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/trigger", post(trigger_import))
            .with_state(self.runner.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/trigger": {
                    "post": {
                        "summary": "Run a catalog import now",
                        "tags": ["Import"],
                        "responses": {
                            "200": {
                                "description": "Import finished; count of books added",
                                "content": {"application/json": {"schema": {
                                    "type": "object",
                                    "properties": {"imported": {"type": "integer"}},
                                    "required": ["imported"]
                                }}}
                            },
                            "409": {
                                "description": "An import run is already in flight",
                                "content": {"application/json": {"schema": {
                                    "$ref": "#/components/schemas/ErrorResponse"
                                }}}
                            }
                        }
                    }
                }
            }
        }))
    }

    /// Spawn the scheduler loop. The first tick fires immediately, so a
    /// fresh deployment gets a populated catalog without waiting a full
    /// interval.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let runner = self.runner.clone();
        let period = Duration::from_secs(self.interval_secs);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match runner.try_run().await {
                    None => {
                        tracing::warn!("previous import run still in flight, skipping tick");
                    }
                    Some(Ok(added)) => {
                        tracing::info!(added, "scheduled import finished");
                    }
                    Some(Err(err)) => {
                        // No mid-cycle retry; the next tick gets a fresh run.
                        tracing::error!(error = ?err, "scheduled import failed");
                    }
                }
            }
        });

        tracing::info!(module = self.name(), "import scheduler started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "import module stopped");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ImportTriggerResponse {
    imported: u32,
}

async fn trigger_import(
    State(runner): State<Arc<ImportRunner>>,
) -> Result<Json<ImportTriggerResponse>, AppError> {
    match runner.try_run().await {
        None => Err(AppError::conflict("an import run is already in flight")),
        Some(Ok(imported)) => Ok(Json(ImportTriggerResponse { imported })),
        Some(Err(err)) => Err(AppError::internal(err)),
    }
}

/// Create a new instance of the import module.
pub fn create_module(
    store: Arc<dyn ImportStore>,
    feed: Arc<dyn BookFeed>,
    interval_secs: u64,
) -> Arc<dyn Module> {
    let pipeline = ImportPipeline::new(store, feed);
    Arc::new(ImportModule {
        runner: Arc::new(ImportRunner::new(pipeline)),
        interval_secs,
    })
}
