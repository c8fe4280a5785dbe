//! # scripture-ref
//!
//! A library for extracting scripture references from noisy, multilingual chat text.
//!
//! Reading groups report progress in free-form messages: "Sudah baca Kej 1-3",
//! "*Mat* 5 sampai 7", "kejadiaan 4", "Kejadian 50 - Keluaran 2". `scripture-ref`
//! finds these references, resolves the book names against a canonical catalog,
//! and validates the chapters, so chat messages can be weakly labeled as
//! reading-progress reports without manual annotation.
//!
//! ## Features
//!
//! - **Priority-ordered matching**: Cross-book ranges, then single-book ranges, then single chapters; no two matches overlap
//! - **Cascaded resolution**: Exact alias lookup, then fuzzy similarity for typos
//! - **Validation**: Out-of-range chapters are flagged, not dropped
//! - **NER spans**: BOOK/CHAPTER labels for sequence-labeling training data
//! - **External candidates**: LLM output goes through the same resolution path
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scripture_ref::{BookCatalog, ReferenceEngine};
//!
//! // Load the embedded catalog of books and aliases
//! let catalog = Arc::new(BookCatalog::load_embedded().unwrap());
//! let engine = ReferenceEngine::new(catalog).unwrap();
//!
//! for r in engine.extract("Sudah baca Kej 1-3, besok Mat 29") {
//!     println!("{} valid={} ({})", r.normalized_text, r.is_valid, r.resolution_method);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Book catalog storage and alias indexing
//! - [`core`]: Core data types for books and references
//! - [`matching`]: Pattern compilation, span matching, resolution and validation
//! - [`parsing`]: Parsers for chat exports and external extractor output
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: HTTP API

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::store::{BookCatalog, CatalogError};
pub use core::book::BookRecord;
pub use core::reference::{ExternalCandidate, NerSpan, ResolvedReference};
pub use core::types::*;
pub use matching::engine::{EngineConfig, EngineError, ReferenceEngine};
pub use matching::resolver::ResolutionCounts;
