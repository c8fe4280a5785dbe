//! Cascaded book-name resolution: exact alias lookup, then fuzzy similarity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::store::BookCatalog;
use crate::core::book::BookRecord;
use crate::core::types::ResolutionMethod;
use crate::matching::similarity::ratio;
use crate::utils::text::normalize_key;

/// Default minimum similarity (0-100) for a fuzzy match
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 80.0;

/// Default minimum similarity for text not known to be an alias
pub const DEFAULT_STRICT_FUZZY_THRESHOLD: f64 = 90.0;

/// Outcome of resolving one piece of book text
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'c> {
    pub book: Option<&'c BookRecord>,
    pub method: ResolutionMethod,
    /// 0.0 to 1.0
    pub confidence: f64,
}

impl<'c> Resolution<'c> {
    fn exact(book: &'c BookRecord) -> Self {
        Self {
            book: Some(book),
            method: ResolutionMethod::Exact,
            confidence: 1.0,
        }
    }

    fn fuzzy(book: &'c BookRecord, score: f64) -> Self {
        Self {
            book: Some(book),
            method: ResolutionMethod::Fuzzy,
            confidence: score / 100.0,
        }
    }

    fn failed() -> Self {
        Self {
            book: None,
            method: ResolutionMethod::Failed,
            confidence: 0.0,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.book.is_some()
    }
}

/// Snapshot of the resolver's per-method counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionCounts {
    pub exact: u64,
    pub fuzzy: u64,
    /// Book candidates that matched no catalog entry. Under the loose
    /// fallback every `word number` pair is a candidate, so this counts
    /// ordinary phrases (`"jam 7"`) as well as misspelled books.
    pub failed: u64,
}

impl ResolutionCounts {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.exact + self.fuzzy + self.failed
    }
}

/// Resolves raw book text to a catalog record.
///
/// Counters are the only mutable state; they use relaxed atomics, so the
/// resolver can be shared across threads and read while in use. A snapshot
/// taken mid-batch may lag in-flight resolutions.
#[derive(Debug)]
pub struct BookResolver {
    catalog: Arc<BookCatalog>,
    fuzzy_threshold: f64,
    exact: AtomicU64,
    fuzzy: AtomicU64,
    failed: AtomicU64,
}

impl BookResolver {
    #[must_use]
    pub fn new(catalog: Arc<BookCatalog>, fuzzy_threshold: f64) -> Self {
        Self {
            catalog,
            fuzzy_threshold,
            exact: AtomicU64::new(0),
            fuzzy: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &BookCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    /// Resolve with the configured fuzzy threshold
    pub fn resolve(&self, raw: &str) -> Resolution<'_> {
        self.resolve_with_threshold(raw, self.fuzzy_threshold)
    }

    /// Resolve with an explicit fuzzy threshold (0-100)
    pub fn resolve_with_threshold(&self, raw: &str, threshold: f64) -> Resolution<'_> {
        let key = normalize_key(raw);
        if key.is_empty() {
            self.failed.fetch_add(1, Ordering::Relaxed);
            return Resolution::failed();
        }

        if let Some(book) = self.catalog.resolve_alias(&key) {
            self.exact.fetch_add(1, Ordering::Relaxed);
            return Resolution::exact(book);
        }

        // Strictly greater keeps the first alias on ties
        let mut best: Option<(&BookRecord, f64)> = None;
        for (alias, book) in self.catalog.aliases() {
            let score = ratio(&key, alias);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((book, score));
            }
        }

        match best {
            Some((book, score)) if score >= threshold => {
                tracing::debug!(
                    "Fuzzy resolved '{}' to {} (score {:.1})",
                    raw,
                    book.id(),
                    score
                );
                self.fuzzy.fetch_add(1, Ordering::Relaxed);
                Resolution::fuzzy(book, score)
            }
            _ => {
                tracing::debug!("Could not resolve book text '{}'", raw);
                self.failed.fetch_add(1, Ordering::Relaxed);
                Resolution::failed()
            }
        }
    }

    #[must_use]
    pub fn stats(&self) -> ResolutionCounts {
        ResolutionCounts {
            exact: self.exact.load(Ordering::Relaxed),
            fuzzy: self.fuzzy.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    pub fn reset_stats(&self) {
        self.exact.store(0, Ordering::Relaxed);
        self.fuzzy.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }
}
