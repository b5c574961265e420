//! Catalog store for Folio: entity types, the data-access contracts, and the
//! in-memory reference engine.
//!
//! The store is split along two trait seams: [`ImportStore`] is the narrow
//! surface the import pipeline consumes (title membership, name lookup,
//! atomic batch commit), [`CatalogStore`] adds the CRUD operations and the
//! ranking procedure used by the HTTP modules. Any relational engine capable
//! of filter+group+aggregate+sort can stand behind the same contracts;
//! [`MemoryCatalog`] is the engine shipped here.

pub mod catalog;
pub mod entities;
pub mod error;
pub mod memory;
pub mod query;

pub use catalog::{CatalogStore, ImportStore};
pub use entities::{
    fold_key, Author, AuthorId, Book, BookId, Genre, GenreId, ImportBatch, Review, ReviewId,
    MAX_NAME_LEN, MAX_TITLE_LEN,
};
pub use error::StoreError;
pub use memory::MemoryCatalog;
pub use query::{BookSearchQuery, RankedBook, ReviewRow};
