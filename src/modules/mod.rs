pub mod authors;
pub mod books;
pub mod genres;
pub mod import;
pub mod reviews;

use std::sync::Arc;

use folio_kernel::settings::Settings;
use folio_kernel::ModuleRegistry;
use folio_store::{CatalogStore, MemoryCatalog};

use self::import::feed::SimulatedFeed;

/// Register every domain module with the registry, handing each its view
/// of the shared catalog store.
pub fn register_all(registry: &mut ModuleRegistry, store: Arc<MemoryCatalog>, settings: &Settings) {
    let catalog: Arc<dyn CatalogStore> = store.clone();

    registry.register(books::create_module(
        catalog.clone(),
        settings.import.top_n,
    ));
    registry.register(authors::create_module(catalog.clone()));
    registry.register(genres::create_module(catalog.clone()));
    registry.register(reviews::create_module(catalog));

    let feed = Arc::new(SimulatedFeed::new(settings.import.feed_record_count));
    registry.register(import::create_module(
        store,
        feed,
        settings.import.interval_secs,
    ));
}
