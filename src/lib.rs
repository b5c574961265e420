//! Folio application: wires the catalog store, the domain modules, the
//! import scheduler, and the HTTP server together.

pub mod modules;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use folio_kernel::settings::Settings;
use folio_kernel::{InitCtx, ModuleRegistry};
use folio_store::MemoryCatalog;

/// Bring the whole service up and serve until the process terminates.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = Arc::new(MemoryCatalog::new());

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store, &settings);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry
        .init_all(&ctx)
        .await
        .context("module initialization failed")?;
    registry
        .start_all(&ctx)
        .await
        .context("module startup failed")?;

    folio_http::start_server(&registry, &settings).await
}
