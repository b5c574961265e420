//! The import pipeline: fetch the whole feed, drop records whose title is
//! already in the catalog, resolve reference entities, and commit the new
//! books as one unit.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use folio_store::{fold_key, Book, ImportBatch, ImportStore, StoreError};

use super::feed::{BookFeed, FeedError};
use super::resolver::EntityResolver;

/// Any failure aborts the run; nothing is committed and the invoker
/// (scheduler tick or manual trigger) decides what happens next. The
/// pipeline itself never retries.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("fetch from the external catalog feed failed")]
    Feed(#[from] FeedError),
    #[error("catalog store operation failed")]
    Store(#[from] StoreError),
}

pub struct ImportPipeline {
    store: Arc<dyn ImportStore>,
    feed: Arc<dyn BookFeed>,
}

impl ImportPipeline {
    pub fn new(store: Arc<dyn ImportStore>, feed: Arc<dyn BookFeed>) -> Self {
        Self { store, feed }
    }

    /// Run one full import and return the number of books added.
    pub async fn import_books(&self) -> Result<u32, ImportError> {
        let started = Instant::now();

        let records = self.feed.fetch_all().await?;
        let fetched = records.len();
        tracing::info!(count = fetched, "fetched records from catalog feed");

        // Seeding the seen-set with the store's titles makes one pass handle
        // both store duplicates and duplicates within the batch: the first
        // occurrence of a folded title wins.
        let mut seen_titles = self.store.book_title_keys().await?;
        let mut survivors = Vec::new();
        for record in records {
            let key = fold_key(&record.title);
            if key.is_empty() || !seen_titles.insert(key) {
                continue;
            }
            survivors.push(record);
        }

        let skipped = fetched - survivors.len();
        tracing::info!(
            new = survivors.len(),
            skipped,
            "deduplicated feed against catalog titles"
        );

        if survivors.is_empty() {
            return Ok(0);
        }

        let author_names = distinct_names(survivors.iter().flat_map(|r| &r.author_names));
        let genre_names = distinct_names(survivors.iter().flat_map(|r| &r.genre_names));

        let resolver = EntityResolver::new(self.store.as_ref());
        let (authors, genres) = tokio::join!(
            resolver.resolve_authors(&author_names),
            resolver.resolve_genres(&genre_names),
        );
        let authors = authors?;
        let genres = genres?;
        tracing::info!(
            authors = authors.len(),
            new_authors = authors.created().len(),
            genres = genres.len(),
            new_genres = genres.created().len(),
            "resolved reference entities"
        );

        let mut batch = ImportBatch::default();
        for record in survivors {
            let mut book = Book::new(record.title.trim(), record.price);
            for name in &record.author_names {
                // Names missing from the mapping are skipped, never an error.
                if let Some(author) = authors.get(name) {
                    if !book.author_ids.contains(&author.id) {
                        book.author_ids.push(author.id);
                    }
                }
            }
            for name in &record.genre_names {
                if let Some(genre) = genres.get(name) {
                    if !book.genre_ids.contains(&genre.id) {
                        book.genre_ids.push(genre.id);
                    }
                }
            }
            batch.books.push(book);
        }
        batch.authors = authors.into_created();
        batch.genres = genres.into_created();

        let added = batch.books.len() as u32;
        self.store.commit_import(batch).await?;

        tracing::info!(
            added,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "import completed"
        );
        Ok(added)
    }
}

/// First-seen spelling of every case-insensitively distinct name.
fn distinct_names<'a>(names: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut distinct = Vec::new();
    for name in names {
        if seen.insert(fold_key(name)) {
            distinct.push(name.clone());
        }
    }
    distinct
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use folio_store::{Author, CatalogStore, Genre, MemoryCatalog};

    use super::super::feed::ImportRecord;
    use super::super::ImportRunner;
    use super::*;

    struct StubFeed {
        records: Vec<ImportRecord>,
    }

    #[async_trait]
    impl BookFeed for StubFeed {
        async fn fetch_all(&self) -> Result<Vec<ImportRecord>, FeedError> {
            Ok(self.records.clone())
        }
    }

    struct FailingFeed;

    #[async_trait]
    impl BookFeed for FailingFeed {
        async fn fetch_all(&self) -> Result<Vec<ImportRecord>, FeedError> {
            Err(FeedError::Unreachable {
                reason: "connection refused".to_string(),
            })
        }
    }

    /// Delegates reads to a real catalog but refuses the commit.
    struct CommitFailsStore {
        inner: MemoryCatalog,
    }

    #[async_trait]
    impl ImportStore for CommitFailsStore {
        async fn book_title_keys(
            &self,
        ) -> Result<std::collections::HashSet<String>, StoreError> {
            self.inner.book_title_keys().await
        }

        async fn authors_by_folded_names(
            &self,
            names: &std::collections::HashSet<String>,
        ) -> Result<Vec<Author>, StoreError> {
            self.inner.authors_by_folded_names(names).await
        }

        async fn genres_by_folded_names(
            &self,
            names: &std::collections::HashSet<String>,
        ) -> Result<Vec<Genre>, StoreError> {
            self.inner.genres_by_folded_names(names).await
        }

        async fn commit_import(&self, _batch: ImportBatch) -> Result<(), StoreError> {
            Err(StoreError::unavailable("connection lost during commit"))
        }
    }

    /// Holds the fetch until released, to pin the single-flight window open.
    struct BlockingFeed {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl BookFeed for BlockingFeed {
        async fn fetch_all(&self) -> Result<Vec<ImportRecord>, FeedError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(Vec::new())
        }
    }

    fn record(title: &str, authors: &[&str], genres: &[&str]) -> ImportRecord {
        ImportRecord {
            title: title.to_string(),
            price: 9.99,
            author_names: authors.iter().map(|s| s.to_string()).collect(),
            genre_names: genres.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn pipeline_over(
        store: Arc<MemoryCatalog>,
        records: Vec<ImportRecord>,
    ) -> ImportPipeline {
        ImportPipeline::new(store, Arc::new(StubFeed { records }))
    }

    #[tokio::test]
    async fn imports_new_records_with_relations() {
        let store = Arc::new(MemoryCatalog::new());
        let pipeline = pipeline_over(
            store.clone(),
            vec![
                record("Dune", &["Frank Herbert"], &["Science Fiction"]),
                record("Hyperion", &["Dan Simmons"], &["Science Fiction"]),
            ],
        );

        assert_eq!(pipeline.import_books().await.unwrap(), 2);

        let rows = store.list_books_detailed().await.unwrap();
        assert_eq!(rows.len(), 2);
        let dune = rows.iter().find(|r| r.title == "Dune").unwrap();
        assert_eq!(dune.author_names, vec!["Frank Herbert"]);
        assert_eq!(dune.genre_names, vec!["Science Fiction"]);
        // Both books share one genre row.
        assert_eq!(store.list_genres().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_run_over_unchanged_feed_imports_nothing() {
        let store = Arc::new(MemoryCatalog::new());
        let records = vec![
            record("Dune", &["Frank Herbert"], &["Science Fiction"]),
            record("Hyperion", &["Dan Simmons"], &["Science Fiction"]),
        ];
        let pipeline = pipeline_over(store.clone(), records);

        assert_eq!(pipeline.import_books().await.unwrap(), 2);
        assert_eq!(pipeline.import_books().await.unwrap(), 0);
        assert_eq!(store.list_books().await.unwrap().len(), 2);
        assert_eq!(store.list_authors().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn title_variants_within_a_batch_import_once() {
        let store = Arc::new(MemoryCatalog::new());
        let pipeline = pipeline_over(
            store.clone(),
            vec![record("Dune", &[], &[]), record(" dune ", &[], &[])],
        );

        assert_eq!(pipeline.import_books().await.unwrap(), 1);
        let books = store.list_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
    }

    #[tokio::test]
    async fn title_variant_of_existing_book_is_skipped() {
        let store = Arc::new(MemoryCatalog::new());
        store.insert_book(Book::new("Dune", 12.0)).await.unwrap();

        let pipeline = pipeline_over(store.clone(), vec![record(" DUNE ", &[], &[])]);
        assert_eq!(pipeline.import_books().await.unwrap(), 0);
        assert_eq!(store.list_books().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn author_spelling_variants_share_one_row() {
        let store = Arc::new(MemoryCatalog::new());
        let pipeline = pipeline_over(
            store.clone(),
            vec![
                record("First Book", &["Jane Doe"], &[]),
                record("Second Book", &["jane doe"], &[]),
            ],
        );

        assert_eq!(pipeline.import_books().await.unwrap(), 2);

        let authors = store.list_authors().await.unwrap();
        assert_eq!(authors.len(), 1);
        let jane = &authors[0];
        for book in store.list_books().await.unwrap() {
            assert_eq!(book.author_ids, vec![jane.id]);
        }
    }

    #[tokio::test]
    async fn new_authors_default_to_sentinel_birth_year() {
        let store = Arc::new(MemoryCatalog::new());
        let pipeline = pipeline_over(store.clone(), vec![record("Dune", &["Frank Herbert"], &[])]);
        pipeline.import_books().await.unwrap();

        let authors = store.list_authors().await.unwrap();
        assert_eq!(authors[0].birth_year, 1970);
    }

    #[tokio::test]
    async fn duplicate_names_on_one_record_attach_once() {
        let store = Arc::new(MemoryCatalog::new());
        let pipeline = pipeline_over(
            store.clone(),
            vec![record("Dune", &["Frank Herbert", "frank herbert"], &[])],
        );
        pipeline.import_books().await.unwrap();

        let books = store.list_books().await.unwrap();
        assert_eq!(books[0].author_ids.len(), 1);
    }

    #[tokio::test]
    async fn empty_feed_imports_nothing() {
        let store = Arc::new(MemoryCatalog::new());
        let pipeline = pipeline_over(store.clone(), Vec::new());

        assert_eq!(pipeline.import_books().await.unwrap(), 0);
        assert!(store.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_without_relations_imports_as_bare_book() {
        let store = Arc::new(MemoryCatalog::new());
        let pipeline = pipeline_over(store.clone(), vec![record("Dune", &[], &[])]);

        assert_eq!(pipeline.import_books().await.unwrap(), 1);
        let books = store.list_books().await.unwrap();
        assert!(books[0].author_ids.is_empty());
        assert!(books[0].genre_ids.is_empty());
    }

    #[tokio::test]
    async fn feed_failure_aborts_the_run() {
        let store = Arc::new(MemoryCatalog::new());
        let pipeline = ImportPipeline::new(store.clone(), Arc::new(FailingFeed));

        let err = pipeline.import_books().await.unwrap_err();
        assert!(matches!(err, ImportError::Feed(_)));
        assert!(store.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn commit_failure_leaves_no_partial_import() {
        let store = Arc::new(CommitFailsStore {
            inner: MemoryCatalog::new(),
        });
        let pipeline = ImportPipeline::new(
            store.clone(),
            Arc::new(StubFeed {
                records: vec![record("Dune", &["Frank Herbert"], &["Science Fiction"])],
            }),
        );

        let err = pipeline.import_books().await.unwrap_err();
        assert!(matches!(err, ImportError::Store(_)));
        // Nothing landed: not the book, not the resolved entities.
        assert!(store.inner.list_books().await.unwrap().is_empty());
        assert!(store.inner.list_authors().await.unwrap().is_empty());
        assert!(store.inner.list_genres().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_trigger_is_reported_busy() {
        let store = Arc::new(MemoryCatalog::new());
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let feed = Arc::new(BlockingFeed {
            entered: entered.clone(),
            release: release.clone(),
        });

        let runner = Arc::new(ImportRunner::new(ImportPipeline::new(store, feed)));

        let background = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.try_run().await })
        };

        // Wait until the first run holds the guard inside the fetch.
        entered.notified().await;
        assert!(runner.try_run().await.is_none());

        release.notify_one();
        let outcome = background.await.unwrap();
        assert!(matches!(outcome, Some(Ok(0))));
    }
}
