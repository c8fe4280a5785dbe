//! Chapter-range checks against the catalog.

use crate::catalog::store::BookCatalog;
use crate::core::book::BookRecord;

/// Stateless chapter-bound checks; an out-of-range reference is flagged, never an error
pub struct ReferenceValidator;

impl ReferenceValidator {
    /// `1 <= start <= end <= chapter_count`
    #[must_use]
    pub fn validate(book: &BookRecord, start: u32, end: u32) -> bool {
        start >= 1 && end >= 1 && start <= end && end <= book.chapter_count()
    }

    /// A range from `start` in `start_book` to `end` in `end_book`.
    ///
    /// Each chapter must fit its own book and the start book must come before
    /// the end book in catalog order. The same book on both sides falls back to
    /// [`ReferenceValidator::validate`].
    #[must_use]
    pub fn validate_cross(
        catalog: &BookCatalog,
        start_book: &BookRecord,
        start: u32,
        end_book: &BookRecord,
        end: u32,
    ) -> bool {
        if start_book.id() == end_book.id() {
            return Self::validate(start_book, start, end);
        }

        let ordered = match (
            catalog.position(start_book.id()),
            catalog.position(end_book.id()),
        ) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        };

        ordered
            && (1..=start_book.chapter_count()).contains(&start)
            && (1..=end_book.chapter_count()).contains(&end)
    }
}
