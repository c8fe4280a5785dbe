//! Core data types for scripture reference extraction.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`BookRecord`]: A canonical book with its aliases, testament and chapter count
//! - [`ResolvedReference`]: A normalized reference produced by the engine
//! - [`NerSpan`]: A BOOK/CHAPTER span for sequence-labeling training data
//! - [`ExternalCandidate`]: A candidate supplied by an external extractor
//! - [`BookId`], [`Testament`], [`ResolutionMethod`], [`ReferenceSource`]: Shared enums and ids
//!
//! ## Offsets
//!
//! All offsets exposed by these types are **character** offsets (Unicode scalar
//! values) into the source text, half-open: `[start, end)`. Chat text routinely
//! contains emoji and non-ASCII punctuation, so byte offsets would not line up
//! with what annotation tools expect.
//!
//! [`BookRecord`]: book::BookRecord
//! [`ResolvedReference`]: reference::ResolvedReference
//! [`NerSpan`]: reference::NerSpan
//! [`ExternalCandidate`]: reference::ExternalCandidate
//! [`BookId`]: types::BookId
//! [`Testament`]: types::Testament
//! [`ResolutionMethod`]: types::ResolutionMethod
//! [`ReferenceSource`]: types::ReferenceSource

pub mod book;
pub mod reference;
pub mod types;
