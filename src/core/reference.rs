use serde::{Deserialize, Serialize};

use crate::core::types::{BookId, ReferenceSource, ResolutionMethod, Span, SpanLabel, Testament};

/// A scripture reference resolved against the catalog.
///
/// Produced per call by [`ReferenceEngine`](crate::matching::engine::ReferenceEngine);
/// the engine keeps no copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedReference {
    /// Book the reference starts in
    pub book_id: BookId,

    /// Canonical name of the start book
    pub book_name: String,

    /// Testament of the start book
    pub testament: Testament,

    /// End book of a cross-book range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_book_id: Option<BookId>,

    /// Canonical name of the end book of a cross-book range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_book_name: Option<String>,

    /// Chapter numbers beyond `u32::MAX` saturate (and are never valid);
    /// `normalized_text` keeps the digits as written
    pub start_chapter: u32,
    pub end_chapter: u32,

    /// Chapters covered, in reading order
    pub chapters: Vec<u32>,

    /// Text the reference was built from
    pub raw_text: String,

    /// Location of `raw_text` in the source message (rule-based references only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    /// e.g. `"Kejadian 1-3"`
    pub normalized_text: String,

    /// Chapter bounds agree with the catalog
    pub is_valid: bool,

    pub resolution_method: ResolutionMethod,

    /// Book resolution confidence, 0.0 to 1.0 (1.0 for exact matches)
    pub confidence: f64,

    pub source: ReferenceSource,

    /// Free-form label supplied by an external extractor (e.g. `"llm"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,

    /// The external extractor's own score for the candidate, clamped to 0.0..=1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_confidence: Option<f64>,
}

impl ResolvedReference {
    /// True if the reference spans two different books
    #[must_use]
    pub fn is_cross_book(&self) -> bool {
        self.end_book_id
            .as_ref()
            .is_some_and(|end| *end != self.book_id)
    }
}

/// A BOOK or CHAPTER span for token/sequence-labeling training data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NerSpan {
    pub start: usize,
    pub end: usize,
    pub label: SpanLabel,
    pub text: String,
}

impl NerSpan {
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

fn default_confidence() -> f64 {
    1.0
}

fn default_source() -> String {
    "llm".to_string()
}

/// A reference candidate produced outside the pattern matcher.
///
/// This is the shape an external (e.g. LLM-based) extractor hands to
/// [`ReferenceEngine::normalize`](crate::matching::engine::ReferenceEngine::normalize).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCandidate {
    pub book_text: String,
    pub start_chapter: u32,
    pub end_chapter: u32,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "default_source")]
    pub source: String,
}

impl ExternalCandidate {
    pub fn new(book_text: impl Into<String>, start_chapter: u32, end_chapter: u32) -> Self {
        let book_text = book_text.into();
        Self {
            raw_text: book_text.clone(),
            book_text,
            start_chapter,
            end_chapter,
            confidence: default_confidence(),
            source: default_source(),
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub fn with_raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = raw_text.into();
        self
    }
}
