use async_trait::async_trait;
use axum::Router;

/// Context provided to modules during initialization and startup.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Contract every Folio module implements.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; routes mount under `/api/{name}`.
    fn name(&self) -> &'static str;

    /// Called during application startup, before any module starts.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// The module's Axum router.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment merged into the service-wide spec.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Start background tasks. Called after every module is initialized.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and release resources, in reverse registration order.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
