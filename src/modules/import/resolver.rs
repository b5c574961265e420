//! Maps free-text author/genre names from a feed batch onto catalog rows,
//! creating rows only for unmatched names.

use std::collections::{HashMap, HashSet};

use folio_store::{fold_key, Author, Genre, ImportStore, StoreError};

/// Birth year recorded for authors the feed knows nothing about.
pub const DEFAULT_BIRTH_YEAR: i32 = 1970;

/// Outcome of resolving one kind of reference entity: a folded-name map
/// covering every candidate, plus the entities minted this invocation.
/// Minted entities are not persisted until the caller's commit.
pub struct Resolution<T> {
    map: HashMap<String, T>,
    created: Vec<T>,
}

impl<T> Resolution<T> {
    /// Look up by raw name; folding happens here.
    pub fn get(&self, raw_name: &str) -> Option<&T> {
        self.map.get(&fold_key(raw_name))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn created(&self) -> &[T] {
        &self.created
    }

    pub fn into_created(self) -> Vec<T> {
        self.created
    }
}

/// Two-phase get-or-create over the store: one bulk existence lookup, then
/// creation of the complement, exactly once per distinct folded name.
pub struct EntityResolver<'a> {
    store: &'a dyn ImportStore,
}

impl<'a> EntityResolver<'a> {
    pub fn new(store: &'a dyn ImportStore) -> Self {
        Self { store }
    }

    pub async fn resolve_authors(
        &self,
        names: &[String],
    ) -> Result<Resolution<Author>, StoreError> {
        let candidates = fold_candidates(names);
        let folded: HashSet<String> = candidates.keys().cloned().collect();
        let existing = self.store.authors_by_folded_names(&folded).await?;
        Ok(resolve(
            candidates,
            existing,
            |author| fold_key(&author.name),
            |name| Author::new(name, DEFAULT_BIRTH_YEAR),
        ))
    }

    pub async fn resolve_genres(&self, names: &[String]) -> Result<Resolution<Genre>, StoreError> {
        let candidates = fold_candidates(names);
        let folded: HashSet<String> = candidates.keys().cloned().collect();
        let existing = self.store.genres_by_folded_names(&folded).await?;
        Ok(resolve(
            candidates,
            existing,
            |genre| fold_key(&genre.name),
            |name| Genre::new(name),
        ))
    }
}

/// Collapse raw names case-insensitively, keeping the first-seen spelling
/// as the one a new entity would be created with.
fn fold_candidates(names: &[String]) -> HashMap<String, String> {
    let mut candidates = HashMap::new();
    for name in names {
        let folded = fold_key(name);
        if folded.is_empty() {
            continue;
        }
        candidates.entry(folded).or_insert_with(|| name.trim().to_string());
    }
    candidates
}

fn resolve<T: Clone>(
    candidates: HashMap<String, String>,
    existing: Vec<T>,
    key_of: impl Fn(&T) -> String,
    build: impl Fn(&str) -> T,
) -> Resolution<T> {
    let mut map = HashMap::with_capacity(candidates.len());
    for entity in existing {
        map.insert(key_of(&entity), entity);
    }

    // The map itself is the guard against creating a name twice; no second
    // store lookup happens.
    let mut created = Vec::new();
    for (folded, original) in candidates {
        if !map.contains_key(&folded) {
            let entity = build(&original);
            created.push(entity.clone());
            map.insert(folded, entity);
        }
    }

    Resolution { map, created }
}

#[cfg(test)]
mod tests {
    use folio_store::{CatalogStore, MemoryCatalog};

    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn creates_one_entity_per_folded_name() {
        let store = MemoryCatalog::new();
        let resolver = EntityResolver::new(&store);

        let resolution = resolver
            .resolve_authors(&names(&["Jane Doe", "jane doe", " JANE DOE "]))
            .await
            .unwrap();

        assert_eq!(resolution.len(), 1);
        assert_eq!(resolution.created().len(), 1);
        assert_eq!(resolution.created()[0].name, "Jane Doe");
        assert_eq!(resolution.created()[0].birth_year, DEFAULT_BIRTH_YEAR);
    }

    #[tokio::test]
    async fn reuses_existing_entities_case_insensitively() {
        let store = MemoryCatalog::new();
        let jane = Author::new("Jane Doe", 1952);
        store.insert_author(jane.clone()).await.unwrap();

        let resolver = EntityResolver::new(&store);
        let resolution = resolver
            .resolve_authors(&names(&["JANE DOE", "John Smith"]))
            .await
            .unwrap();

        assert_eq!(resolution.len(), 2);
        assert_eq!(resolution.get("jane doe").unwrap().id, jane.id);
        // Only the unmatched name was created.
        assert_eq!(resolution.created().len(), 1);
        assert_eq!(resolution.created()[0].name, "John Smith");
    }

    #[tokio::test]
    async fn mapping_covers_every_candidate() {
        let store = MemoryCatalog::new();
        let resolver = EntityResolver::new(&store);

        let input = names(&["Fiction", "Mystery", "fiction"]);
        let resolution = resolver.resolve_genres(&input).await.unwrap();

        assert_eq!(resolution.len(), 2);
        for name in &input {
            assert!(resolution.get(name).is_some());
        }
    }

    #[tokio::test]
    async fn blank_names_are_ignored() {
        let store = MemoryCatalog::new();
        let resolver = EntityResolver::new(&store);

        let resolution = resolver
            .resolve_genres(&names(&["  ", "History"]))
            .await
            .unwrap();

        assert_eq!(resolution.len(), 1);
        assert!(resolution.get("history").is_some());
    }

    #[tokio::test]
    async fn created_entities_are_not_persisted_by_the_resolver() {
        let store = MemoryCatalog::new();
        let resolver = EntityResolver::new(&store);

        let resolution = resolver
            .resolve_authors(&names(&["Cal Newport"]))
            .await
            .unwrap();
        assert_eq!(resolution.created().len(), 1);

        // The row only lands with the caller's commit.
        assert!(store.list_authors().await.unwrap().is_empty());
    }
}
