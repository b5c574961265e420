//! External catalog feed contract and the deterministic stand-in used in
//! the default deployment.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// One raw book entry from the external feed, prior to dedup and entity
/// resolution. The feed guarantees neither uniqueness nor stable ids.
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub title: String,
    pub price: f32,
    pub author_names: Vec<String>,
    pub genre_names: Vec<String>,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("catalog feed unreachable: {reason}")]
    Unreachable { reason: String },
}

/// Whole-feed fetch; no pagination contract.
#[async_trait]
pub trait BookFeed: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<ImportRecord>, FeedError>;
}

const TITLES: &[&str] = &[
    "The Great Adventure",
    "Mystery of the Night",
    "Journey to the Stars",
    "Code Complete",
    "Clean Code",
    "The Pragmatic Programmer",
    "Design Patterns",
    "Refactoring",
    "Domain-Driven Design",
    "The Phoenix Project",
    "The DevOps Handbook",
    "Accelerate",
    "The Lean Startup",
    "Zero to One",
    "The Innovator's Dilemma",
    "Thinking, Fast and Slow",
    "Atomic Habits",
    "Deep Work",
    "The Art of War",
    "Sapiens",
    "Homo Deus",
];

const AUTHORS: &[&str] = &[
    "John Smith",
    "Jane Doe",
    "Robert Martin",
    "Martin Fowler",
    "Eric Evans",
    "Kent Beck",
    "Steve McConnell",
    "Andrew Hunt",
    "David Thomas",
    "Gene Kim",
    "Jez Humble",
    "Nicole Forsgren",
    "Eric Ries",
    "Peter Thiel",
    "Clayton Christensen",
    "Daniel Kahneman",
    "James Clear",
    "Cal Newport",
    "Sun Tzu",
    "Yuval Noah Harari",
];

const GENRES: &[&str] = &[
    "Fiction",
    "Mystery",
    "Science Fiction",
    "Fantasy",
    "Technology",
    "Programming",
    "Business",
    "Self-Help",
    "History",
    "Philosophy",
    "Biography",
    "Non-Fiction",
];

// Fixed seed keeps the generated catalog reproducible across runs.
const FEED_SEED: u64 = 42;

/// Simulated third-party catalog API. Titles are prefixed with a running
/// number so the generated batch spans many distinct books while author
/// and genre names repeat heavily, exercising entity reuse.
pub struct SimulatedFeed {
    record_count: usize,
}

impl SimulatedFeed {
    pub fn new(record_count: usize) -> Self {
        Self { record_count }
    }
}

#[async_trait]
impl BookFeed for SimulatedFeed {
    async fn fetch_all(&self) -> Result<Vec<ImportRecord>, FeedError> {
        let mut rng = StdRng::seed_from_u64(FEED_SEED);
        let mut records = Vec::with_capacity(self.record_count);

        for i in 0..self.record_count {
            let title = format!("{} {}", i + 1, TITLES[rng.gen_range(0..TITLES.len())]);
            let price = (rng.gen::<f64>() * 125.0 * 100.0).round() as f32 / 100.0;

            records.push(ImportRecord {
                title,
                price,
                author_names: pick_distinct(&mut rng, AUTHORS),
                genre_names: pick_distinct(&mut rng, GENRES),
            });
        }

        tracing::debug!(count = records.len(), "simulated feed generated");
        Ok(records)
    }
}

/// Between one and three distinct names from the pool.
fn pick_distinct(rng: &mut StdRng, pool: &[&str]) -> Vec<String> {
    let want = rng.gen_range(1..=3);
    let mut out: Vec<String> = Vec::with_capacity(want);
    for _ in 0..want {
        let candidate = pool[rng.gen_range(0..pool.len())];
        if !out.iter().any(|name| name == candidate) {
            out.push(candidate.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn feed_is_deterministic() {
        let feed = SimulatedFeed::new(50);
        let first = feed.fetch_all().await.unwrap();
        let second = feed.fetch_all().await.unwrap();

        assert_eq!(first.len(), 50);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.title, b.title);
            assert_eq!(a.price, b.price);
            assert_eq!(a.author_names, b.author_names);
        }
    }

    #[tokio::test]
    async fn every_record_has_relations_and_unique_title() {
        let feed = SimulatedFeed::new(100);
        let records = feed.fetch_all().await.unwrap();

        for record in &records {
            assert!(!record.author_names.is_empty());
            assert!(record.author_names.len() <= 3);
            assert!(!record.genre_names.is_empty());
            assert!(record.price >= 0.0);
        }

        let titles: std::collections::HashSet<&str> =
            records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles.len(), records.len());
    }
}
