use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::store::BookCatalog;
use crate::core::book::BookRecord;
use crate::core::reference::{ExternalCandidate, NerSpan, ResolvedReference};
use crate::core::types::{ReferenceSource, ResolutionMethod, Span, SpanLabel};
use crate::matching::patterns::{
    CompileError, PatternCompiler, PatternKind, PatternSet, DEFAULT_RANGE_WORDS,
};
use crate::matching::resolver::{
    BookResolver, Resolution, ResolutionCounts, DEFAULT_FUZZY_THRESHOLD,
    DEFAULT_STRICT_FUZZY_THRESHOLD,
};
use crate::matching::span::{MatchCandidate, SpanMatcher, TextSpan};
use crate::matching::validator::ReferenceValidator;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Fuzzy threshold must lie in 0..=100, got {0}")]
    InvalidThreshold(f64),
}

/// Configuration for the reference engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Words joining two chapters of a worded range (`Kej 1 sampai 3`)
    pub range_words: Vec<String>,

    /// Minimum similarity (0-100) to accept a fuzzy book match
    pub fuzzy_threshold: f64,

    /// Minimum similarity for book text caught by the loose fallback pattern
    pub strict_fuzzy_threshold: f64,

    /// Also match `WORD CH` for words outside the alias list
    pub loose_fallback: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            range_words: DEFAULT_RANGE_WORDS.iter().map(|w| (*w).to_string()).collect(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            strict_fuzzy_threshold: DEFAULT_STRICT_FUZZY_THRESHOLD,
            loose_fallback: true,
        }
    }
}

impl EngineConfig {
    /// Check thresholds are within 0..=100
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidThreshold` with the first offending value.
    pub fn validate(&self) -> Result<(), EngineError> {
        for threshold in [self.fuzzy_threshold, self.strict_fuzzy_threshold] {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(EngineError::InvalidThreshold(threshold));
            }
        }
        Ok(())
    }
}

/// Extracts and normalizes scripture references.
///
/// Patterns are compiled once at construction. The engine is `Send + Sync`;
/// its only mutable state is the resolver's atomic counters.
#[derive(Debug)]
pub struct ReferenceEngine {
    catalog: Arc<BookCatalog>,
    config: EngineConfig,
    patterns: PatternSet,
    resolver: BookResolver,
    /// Longest book in the catalog; wider single-book spans are not enumerated
    max_chapter_count: u32,
}

impl ReferenceEngine {
    /// Create an engine with default configuration
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Compile` if the catalog yields no usable patterns.
    pub fn new(catalog: Arc<BookCatalog>) -> Result<Self, EngineError> {
        Self::with_config(catalog, EngineConfig::default())
    }

    /// Create an engine with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidThreshold` for a threshold outside 0..=100,
    /// or `EngineError::Compile` if pattern compilation fails.
    pub fn with_config(catalog: Arc<BookCatalog>, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let patterns = PatternCompiler::new(config.range_words.clone())
            .with_loose_fallback(config.loose_fallback)
            .compile(&catalog)?;
        let resolver = BookResolver::new(Arc::clone(&catalog), config.fuzzy_threshold);
        let max_chapter_count = catalog
            .books()
            .iter()
            .map(BookRecord::chapter_count)
            .max()
            .unwrap_or(0);

        tracing::info!(
            "Reference engine ready: {} books, {} aliases, {} patterns",
            catalog.len(),
            catalog.alias_count(),
            patterns.all().len()
        );

        Ok(Self {
            catalog,
            config,
            patterns,
            resolver,
            max_chapter_count,
        })
    }

    /// Extract resolved references from free text, ordered by position.
    ///
    /// Candidates whose book text does not resolve are dropped. Candidates
    /// with out-of-range chapters are kept with `is_valid = false`.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<ResolvedReference> {
        SpanMatcher::new(self.patterns.all())
            .find_matches(text)
            .iter()
            .filter_map(|candidate| self.interpret(candidate))
            .collect()
    }

    /// BOOK and CHAPTER spans of the alias-pattern matches, for sequence labeling.
    ///
    /// The chapters of a single-book range form one CHAPTER span from the first
    /// chapter digit to the last.
    #[must_use]
    pub fn extract_spans(&self, text: &str) -> Vec<NerSpan> {
        let chars: Vec<char> = text.chars().collect();
        let mut spans = Vec::new();

        for candidate in SpanMatcher::new(self.patterns.rule_patterns()).find_matches(text) {
            spans.push(ner_span(&candidate.book, SpanLabel::Book));

            match candidate.kind {
                PatternKind::CrossBookDash | PatternKind::CrossBookWords => {
                    let start_end = candidate
                        .start_tail
                        .as_ref()
                        .map_or(candidate.start_chapter.end, |t| t.end);
                    spans.push(chapter_span(&chars, candidate.start_chapter.start, start_end));
                    if let Some(end_book) = &candidate.end_book {
                        spans.push(ner_span(end_book, SpanLabel::Book));
                    }
                    if let Some(end_chapter) = &candidate.end_chapter {
                        spans.push(ner_span(end_chapter, SpanLabel::Chapter));
                    }
                }
                PatternKind::RangeDash | PatternKind::RangeWords => {
                    let end = candidate
                        .end_chapter
                        .as_ref()
                        .map_or(candidate.start_chapter.end, |c| c.end);
                    spans.push(chapter_span(&chars, candidate.start_chapter.start, end));
                }
                PatternKind::SingleChapter | PatternKind::Loose => {
                    spans.push(ner_span(&candidate.start_chapter, SpanLabel::Chapter));
                }
            }
        }

        spans
    }

    /// Push externally extracted candidates through the same resolution and
    /// validation path as rule-based matches
    #[must_use]
    pub fn normalize(&self, candidates: &[ExternalCandidate]) -> Vec<ResolvedReference> {
        candidates
            .iter()
            .filter_map(|candidate| {
                let resolution = self.resolver.resolve(&candidate.book_text);
                let book = resolution.book?;
                let raw_text = if candidate.raw_text.is_empty() {
                    candidate.book_text.clone()
                } else {
                    candidate.raw_text.clone()
                };

                let mut reference = self.build_reference(
                    book,
                    None,
                    candidate.start_chapter,
                    candidate.end_chapter,
                    raw_text,
                );
                reference.resolution_method = resolution.method;
                reference.confidence = resolution.confidence;
                reference.source = ReferenceSource::External;
                reference.source_label = Some(candidate.source.clone());
                reference.candidate_confidence = Some(candidate.confidence.clamp(0.0, 1.0));
                Some(reference)
            })
            .collect()
    }

    /// Resolution counters since construction (or the last reset).
    ///
    /// With the loose fallback enabled, any `word number` pair in the text is
    /// a book candidate, so ordinary phrases such as "jam 7" count as `failed`.
    /// Read `failed` as rejected candidates, not as missed references.
    #[must_use]
    pub fn stats(&self) -> ResolutionCounts {
        self.resolver.stats()
    }

    pub fn reset_stats(&self) {
        self.resolver.reset_stats();
    }

    #[must_use]
    pub fn catalog(&self) -> &BookCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn interpret(&self, candidate: &MatchCandidate) -> Option<ResolvedReference> {
        let threshold = match candidate.kind {
            PatternKind::Loose => self.config.strict_fuzzy_threshold,
            _ => self.config.fuzzy_threshold,
        };

        // Both books are resolved before either failure is acted on, so each counts
        let start = self
            .resolver
            .resolve_with_threshold(&candidate.book.text, threshold);
        let end = candidate
            .end_book
            .as_ref()
            .map(|b| self.resolver.resolve_with_threshold(&b.text, threshold));

        let start_book = start.book?;
        let end_book = match &end {
            Some(resolution) => Some(resolution.book?),
            None => None,
        };

        let mut reference = self.build_reference(
            start_book,
            end_book,
            candidate.start_value(),
            candidate.end_value(),
            candidate.raw_text.clone(),
        );

        // Chapter values saturate at u32::MAX; the text keeps the digits as written
        let start_digits = candidate.start_chapter.chapter_digits();
        let end_digits = candidate
            .end_chapter
            .as_ref()
            .map_or(start_digits, TextSpan::chapter_digits);
        reference.normalized_text = format_reference(
            &reference.book_name,
            reference.end_book_name.as_deref(),
            start_digits,
            end_digits,
        );

        let resolutions = std::iter::once(&start).chain(end.as_ref());
        let (method, confidence) = combine(resolutions);
        reference.resolution_method = method;
        reference.confidence = confidence;
        reference.span = Some(candidate.span);

        tracing::debug!(
            "Resolved '{}' to {} (valid: {})",
            reference.raw_text,
            reference.normalized_text,
            reference.is_valid
        );

        Some(reference)
    }

    /// Rule-sourced, exactly resolved reference; callers adjust resolution fields
    fn build_reference(
        &self,
        book: &BookRecord,
        end_book: Option<&BookRecord>,
        start: u32,
        end: u32,
        raw_text: String,
    ) -> ResolvedReference {
        let end_book = end_book.filter(|b| b.id() != book.id());

        let (is_valid, chapters, normalized_text) = match end_book {
            Some(end_book) => {
                let is_valid =
                    ReferenceValidator::validate_cross(&self.catalog, book, start, end_book, end);
                let chapters = if is_valid {
                    self.cross_book_chapters(book, start, end_book, end)
                } else {
                    Vec::new()
                };
                let normalized = format_reference(
                    book.canonical_name(),
                    Some(end_book.canonical_name()),
                    &start.to_string(),
                    &end.to_string(),
                );
                (is_valid, chapters, normalized)
            }
            None => {
                let is_valid = ReferenceValidator::validate(book, start, end);
                let chapters = if end.saturating_sub(start) > self.max_chapter_count {
                    Vec::new()
                } else {
                    (start..=end).collect()
                };
                let normalized = format_reference(
                    book.canonical_name(),
                    None,
                    &start.to_string(),
                    &end.to_string(),
                );
                (is_valid, chapters, normalized)
            }
        };

        ResolvedReference {
            book_id: book.id().clone(),
            book_name: book.canonical_name().to_string(),
            testament: book.testament(),
            end_book_id: end_book.map(|b| b.id().clone()),
            end_book_name: end_book.map(|b| b.canonical_name().to_string()),
            start_chapter: start,
            end_chapter: end,
            chapters,
            raw_text,
            span: None,
            normalized_text,
            is_valid,
            resolution_method: ResolutionMethod::Exact,
            confidence: 1.0,
            source: ReferenceSource::Rule,
            source_label: None,
            candidate_confidence: None,
        }
    }

    /// Rest of the start book, every intervening book, then the head of the end book
    fn cross_book_chapters(
        &self,
        start_book: &BookRecord,
        start: u32,
        end_book: &BookRecord,
        end: u32,
    ) -> Vec<u32> {
        let mut chapters: Vec<u32> = (start..=start_book.chapter_count()).collect();

        if let (Some(first), Some(last)) = (
            self.catalog.position(start_book.id()),
            self.catalog.position(end_book.id()),
        ) {
            for book in self.catalog.books().get(first + 1..last).unwrap_or_default() {
                chapters.extend(1..=book.chapter_count());
            }
        }

        chapters.extend(1..=end);
        chapters
    }
}

/// `"{book} {start}-{end}"`, `"{book} {chapter}"`, or `"{book} {start}-{end_book} {end}"`
fn format_reference(book: &str, end_book: Option<&str>, start: &str, end: &str) -> String {
    match end_book {
        Some(end_book) => format!("{book} {start}-{end_book} {end}"),
        None if start == end => format!("{book} {start}"),
        None => format!("{book} {start}-{end}"),
    }
}

/// Fuzzy if any book resolved fuzzily; confidence is the weakest link
fn combine<'a, 'c: 'a>(resolutions: impl Iterator<Item = &'a Resolution<'c>>) -> (ResolutionMethod, f64) {
    resolutions.fold((ResolutionMethod::Exact, 1.0_f64), |(method, confidence), r| {
        let method = if r.method == ResolutionMethod::Fuzzy {
            ResolutionMethod::Fuzzy
        } else {
            method
        };
        (method, confidence.min(r.confidence))
    })
}

fn ner_span(span: &TextSpan, label: SpanLabel) -> NerSpan {
    NerSpan {
        start: span.start,
        end: span.end,
        label,
        text: span.text.clone(),
    }
}

fn chapter_span(chars: &[char], start: usize, end: usize) -> NerSpan {
    let text = chars
        .get(start..end)
        .map(|slice| slice.iter().collect())
        .unwrap_or_default();
    NerSpan {
        start,
        end,
        label: SpanLabel::Chapter,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BookId;

    fn engine() -> ReferenceEngine {
        let catalog = Arc::new(BookCatalog::load_embedded().unwrap());
        ReferenceEngine::new(catalog).unwrap()
    }

    #[test]
    fn test_single_book_range() {
        let engine = engine();
        let refs = engine.extract("Kej 1-3");
        assert_eq!(refs.len(), 1);
        let r = &refs[0];
        assert_eq!(r.book_name, "Kejadian");
        assert_eq!((r.start_chapter, r.end_chapter), (1, 3));
        assert_eq!(r.chapters, vec![1, 2, 3]);
        assert!(r.is_valid);
        assert_eq!(r.normalized_text, "Kejadian 1-3");
        assert_eq!(r.resolution_method, ResolutionMethod::Exact);
        assert_eq!(r.source, ReferenceSource::Rule);
        assert_eq!(r.span, Some(Span::new(0, 7)));
    }

    #[test]
    fn test_out_of_range_chapter_is_flagged_not_dropped() {
        let engine = engine();
        let refs = engine.extract("Mat 29");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].book_id, BookId::new("MAT"));
        assert!(!refs[0].is_valid);
        assert_eq!(refs[0].chapters, vec![29]);
        assert_eq!(refs[0].normalized_text, "Matius 29");
    }

    #[test]
    fn test_invalid_range_keeps_written_chapters() {
        let engine = engine();
        let r = &engine.extract("Mat 27-30")[0];
        assert!(!r.is_valid);
        assert_eq!((r.start_chapter, r.end_chapter), (27, 30));
        assert_eq!(r.chapters, vec![27, 28, 29, 30]);

        let zero = &engine.extract("Kej 0")[0];
        assert_eq!(zero.chapters, vec![0]);

        let backwards = &engine.extract("Kej 3-1")[0];
        assert!(backwards.chapters.is_empty());
    }

    #[test]
    fn test_absurd_range_is_not_enumerated() {
        let engine = engine();
        let r = &engine.extract("Mzm 1-4000")[0];
        assert!(!r.is_valid);
        assert_eq!(r.end_chapter, 4000);
        assert!(r.chapters.is_empty());

        // Widest span that is still enumerated: the longest book
        let psalms = &engine.extract("Mzm 1-150")[0];
        assert_eq!(psalms.chapters.len(), 150);
    }

    #[test]
    fn test_overflowing_chapter_keeps_written_digits() {
        let engine = engine();
        let r = &engine.extract("Mat 99999999999")[0];
        assert!(!r.is_valid);
        assert_eq!(r.start_chapter, u32::MAX);
        assert_eq!(r.normalized_text, "Matius 99999999999");

        let padded = &engine.extract("Mat 05")[0];
        assert_eq!(padded.normalized_text, "Matius 5");
    }

    #[test]
    fn test_unresolvable_book_is_dropped_and_counted() {
        let engine = engine();
        let before = engine.stats().failed;
        assert!(engine.extract("Xyz 5").is_empty());
        assert_eq!(engine.stats().failed, before + 1);
    }

    #[test]
    fn test_cross_book_worded_range_with_start_tail() {
        let engine = engine();
        let refs = engine.extract("Kejadian 1-3 sampai Keluaran 2");
        assert_eq!(refs.len(), 1);
        let r = &refs[0];
        assert!(r.is_cross_book());
        assert_eq!(r.book_id, BookId::new("GEN"));
        assert_eq!(r.end_book_id, Some(BookId::new("EXO")));
        assert_eq!((r.start_chapter, r.end_chapter), (1, 2));
        assert!(r.is_valid);
        assert_eq!(r.normalized_text, "Kejadian 1-Keluaran 2");
        assert_eq!(r.chapters.len(), 52);
        assert_eq!(r.chapters.first(), Some(&1));
        assert_eq!(&r.chapters[48..], &[49, 50, 1, 2]);
    }

    #[test]
    fn test_cross_book_dash_range() {
        let engine = engine();
        let refs = engine.extract("Kej 50 - Kel 2");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].chapters, vec![50, 1, 2]);
        assert_eq!(refs[0].end_book_name.as_deref(), Some("Keluaran"));
    }

    #[test]
    fn test_cross_book_backwards_is_invalid() {
        let engine = engine();
        let refs = engine.extract("Kel 2 sampai Kej 50");
        assert_eq!(refs.len(), 1);
        assert!(!refs[0].is_valid);
        assert!(refs[0].chapters.is_empty());
    }

    #[test]
    fn test_no_space_lowercase() {
        let engine = engine();
        let refs = engine.extract("kej1");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].book_id, BookId::new("GEN"));
        assert_eq!(refs[0].start_chapter, 1);
    }

    #[test]
    fn test_fuzzy_book_via_loose_fallback() {
        let engine = engine();
        let refs = engine.extract("sudah baca Kejadiaan 4");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].book_id, BookId::new("GEN"));
        assert_eq!(refs[0].resolution_method, ResolutionMethod::Fuzzy);
        assert!(refs[0].confidence >= engine.config().strict_fuzzy_threshold / 100.0);
    }

    #[test]
    fn test_loose_fallback_disabled() {
        let catalog = Arc::new(BookCatalog::load_embedded().unwrap());
        let config = EngineConfig {
            loose_fallback: false,
            ..EngineConfig::default()
        };
        let engine = ReferenceEngine::with_config(catalog, config).unwrap();
        assert!(engine.extract("Xyz 5").is_empty());
        assert_eq!(engine.stats().failed, 0);
        assert!(engine.patterns().fallback().is_none());
    }

    #[test]
    fn test_idempotent_via_normalized_text() {
        let engine = engine();
        let first = engine.extract("Kejadian 1-3");
        let again = engine.extract(&first[0].normalized_text);
        assert_eq!(again.len(), 1);
        assert_eq!(
            (&again[0].book_id, again[0].start_chapter, again[0].end_chapter),
            (&first[0].book_id, first[0].start_chapter, first[0].end_chapter)
        );
    }

    #[test]
    fn test_multiple_references_in_order() {
        let engine = engine();
        let refs = engine.extract("Sudah baca Mat 5 sampai 7, lalu Yoh 3 dan Kej 1-2");
        let texts: Vec<_> = refs.iter().map(|r| r.normalized_text.as_str()).collect();
        assert_eq!(texts, vec!["Matius 5-7", "Yohanes 3", "Kejadian 1-2"]);
    }

    #[test]
    fn test_extract_spans_merges_range_chapters() {
        let engine = engine();
        let spans = engine.extract_spans("baca Kej 1-3");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].label, SpanLabel::Book);
        assert_eq!(spans[0].text, "Kej");
        assert_eq!((spans[0].start, spans[0].end), (5, 8));
        assert_eq!(spans[1].label, SpanLabel::Chapter);
        assert_eq!(spans[1].text, "1-3");
        assert_eq!((spans[1].start, spans[1].end), (9, 12));
    }

    #[test]
    fn test_extract_spans_cross_book() {
        let engine = engine();
        let spans = engine.extract_spans("Kejadian 1-3 sampai Keluaran 2");
        let labels: Vec<_> = spans.iter().map(|s| (s.label, s.text.as_str())).collect();
        assert_eq!(
            labels,
            vec![
                (SpanLabel::Book, "Kejadian"),
                (SpanLabel::Chapter, "1-3"),
                (SpanLabel::Book, "Keluaran"),
                (SpanLabel::Chapter, "2"),
            ]
        );
    }

    #[test]
    fn test_extract_spans_skips_loose_matches() {
        let engine = engine();
        let spans = engine.extract_spans("Xyz 5 dan Mat 1");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Mat");
    }

    #[test]
    fn test_extract_spans_never_overlap() {
        let engine = engine();
        let spans = engine.extract_spans("Kej 1-3, Kel 2 sampai Im 4, **Mat** 5 - Mrk 2, yoh3");
        for (i, a) in spans.iter().enumerate() {
            for b in &spans[i + 1..] {
                assert!(!a.span().overlaps(&b.span()), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_normalize_external_candidates() {
        let engine = engine();
        let candidates = vec![
            ExternalCandidate::new("Kejadian", 1, 3).with_confidence(0.9),
            ExternalCandidate::new("Kejadiaan", 2, 2).with_source("gpt"),
            ExternalCandidate::new("Xyz", 1, 1),
            ExternalCandidate::new("Matius", 30, 31),
        ];
        let refs = engine.normalize(&candidates);
        assert_eq!(refs.len(), 3);

        assert_eq!(refs[0].source, ReferenceSource::External);
        assert_eq!(refs[0].source_label.as_deref(), Some("llm"));
        assert!((refs[0].confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(refs[0].candidate_confidence, Some(0.9));
        assert!(refs[0].span.is_none());

        assert_eq!(refs[1].resolution_method, ResolutionMethod::Fuzzy);
        assert_eq!(refs[1].source_label.as_deref(), Some("gpt"));

        assert!(!refs[2].is_valid);
    }

    #[test]
    fn test_normalize_clamps_candidate_confidence() {
        let engine = engine();
        let refs = engine.normalize(&[ExternalCandidate::new("Kej", 1, 1).with_confidence(1.5)]);
        assert!((refs[0].confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(refs[0].candidate_confidence, Some(1.0));
    }

    #[test]
    fn test_normalize_fuzzy_confidence_ignores_extractor_score() {
        let engine = engine();
        let refs = engine.normalize(&[ExternalCandidate::new("Kejadiaan", 1, 1).with_confidence(0.5)]);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].resolution_method, ResolutionMethod::Fuzzy);
        assert!(refs[0].confidence >= engine.config().fuzzy_threshold / 100.0);
        assert_eq!(refs[0].candidate_confidence, Some(0.5));
    }

    #[test]
    fn test_rule_references_have_no_candidate_confidence() {
        let engine = engine();
        assert_eq!(engine.extract("Kej 1")[0].candidate_confidence, None);
    }

    #[test]
    fn test_loose_word_number_pairs_count_as_failed() {
        let engine = engine();
        let refs = engine.extract("jam 7 pagi baca Kej 1");
        assert_eq!(refs.len(), 1);
        let stats = engine.stats();
        assert_eq!((stats.exact, stats.failed), (1, 1));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let catalog = Arc::new(BookCatalog::load_embedded().unwrap());
        let config = EngineConfig {
            fuzzy_threshold: 120.0,
            ..EngineConfig::default()
        };
        let err = ReferenceEngine::with_config(catalog, config).unwrap_err();
        assert!(matches!(err, EngineError::InvalidThreshold(t) if (t - 120.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"fuzzy_threshold": 85}"#).unwrap();
        assert!((config.fuzzy_threshold - 85.0).abs() < f64::EPSILON);
        assert!(config.loose_fallback);
        assert_eq!(config.range_words.len(), DEFAULT_RANGE_WORDS.len());
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReferenceEngine>();
    }
}
