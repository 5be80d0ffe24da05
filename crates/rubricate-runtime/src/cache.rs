//! Memoized rubric parsing.
//!
//! Parsing is pure, so a scheme can be shared by every answer graded against
//! the same rubric text. Entries are bounded by count and time to live.

use moka::future::Cache;
use rubricate_core::{parse_rubric, RubricScheme};
use std::sync::Arc;
use std::time::Duration;

/// Rubric text to parsed scheme.
#[derive(Clone)]
pub struct RubricCache {
    cache: Cache<String, Arc<RubricScheme>>,
}

impl RubricCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Return the cached scheme for `rubric`, parsing on a miss.
    pub async fn get_or_parse(&self, rubric: &str) -> Arc<RubricScheme> {
        self.cache
            .get_with(rubric.to_string(), async { Arc::new(parse_rubric(rubric)) })
            .await
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Flush pending maintenance so `entry_count` is current.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for RubricCache {
    fn default() -> Self {
        Self::new(1_024, Duration::from_secs(3600))
    }
}

impl std::fmt::Debug for RubricCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RubricCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
