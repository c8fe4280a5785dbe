//! Canonical book catalog storage and alias indexing.
//!
//! The catalog lists every book with its canonical name, aliases (Indonesian
//! and English surface forms), testament and chapter count. An embedded
//! catalog is compiled into the binary, but custom catalogs can also be loaded
//! from JSON files.
//!
//! ## Example
//!
//! ```rust,no_run
//! use scripture_ref::BookCatalog;
//! use scripture_ref::core::types::BookId;
//! use std::path::Path;
//!
//! let catalog = BookCatalog::load_embedded().unwrap();
//! let genesis = catalog.get(&BookId::new("GEN"));
//! let by_alias = catalog.resolve_alias("  kej ");
//!
//! // Export, edit, and load back
//! let json = catalog.to_json().unwrap();
//! let custom = BookCatalog::load_from_file(Path::new("my_books.json")).unwrap();
//! ```

pub mod store;
