//! Scripture reference extraction and resolution.
//!
//! The pipeline, leaf-first:
//!
//! - [`patterns`]: compiles catalog aliases into five ordered reference patterns
//!   (plus an optional loose fallback)
//! - [`span`]: greedy, priority-ordered, non-overlapping match selection
//! - [`resolver`]: exact alias lookup, then fuzzy similarity ([`similarity`])
//! - [`validator`]: chapter bounds against the catalog
//! - [`engine`]: [`ReferenceEngine`](engine::ReferenceEngine), tying the above together
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scripture_ref::{BookCatalog, ReferenceEngine};
//!
//! let catalog = Arc::new(BookCatalog::load_embedded().unwrap());
//! let engine = ReferenceEngine::new(catalog).unwrap();
//!
//! for r in engine.extract("Sudah baca Kej 1-3 dan Mat 5") {
//!     println!("{} (valid: {}, {:.2})", r.normalized_text, r.is_valid, r.confidence);
//! }
//! println!("{:?}", engine.stats());
//! ```

pub mod engine;
pub mod patterns;
pub mod resolver;
pub mod similarity;
pub mod span;
pub mod validator;
