use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::book::{BookData, BookError, BookRecord};
use crate::core::types::BookId;
use crate::utils::text::normalize_key;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Catalog contains no books")]
    Empty,

    #[error("Duplicate book id '{0}'")]
    DuplicateId(BookId),

    #[error("Alias '{alias}' is claimed by both '{first}' and '{second}'")]
    AliasCollision {
        alias: String,
        first: BookId,
        second: BookId,
    },

    #[error("Invalid book '{id}': {source}")]
    InvalidBook {
        id: String,
        #[source]
        source: BookError,
    },
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub books: Vec<BookRecord>,
}

/// Catalog file as read from disk, before record validation
#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: String,
    books: Vec<BookData>,
}

/// The canonical book catalog with its alias index
#[derive(Debug)]
pub struct BookCatalog {
    /// All books, in canonical order
    books: Vec<BookRecord>,

    /// Index: book ID -> index in books vec
    id_to_index: HashMap<BookId, usize>,

    /// Index: normalized alias -> index in books vec
    alias_to_index: HashMap<String, usize>,

    /// (normalized alias, book index) in catalog order, for similarity scans
    alias_order: Vec<(String, usize)>,
}

impl BookCatalog {
    /// Build a catalog from validated records.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty record set,
    /// `CatalogError::DuplicateId` if two records share an id, or
    /// `CatalogError::AliasCollision` if a normalized alias belongs to two books.
    pub fn load(records: Vec<BookRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut catalog = Self {
            books: Vec::with_capacity(records.len()),
            id_to_index: HashMap::new(),
            alias_to_index: HashMap::new(),
            alias_order: Vec::new(),
        };

        for record in records {
            catalog.add_book(record)?;
        }

        tracing::debug!(
            "Loaded catalog: {} books, {} aliases",
            catalog.books.len(),
            catalog.alias_order.len()
        );

        Ok(catalog)
    }

    /// Load the embedded default catalog
    ///
    /// # Errors
    ///
    /// Only fails if the embedded data is inconsistent, which `build.rs` rules out.
    pub fn load_embedded() -> Result<Self, CatalogError> {
        // Validated at compile time via build.rs
        const EMBEDDED_CATALOG: &str = include_str!("../../catalogs/books.json");
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReadError` if the file cannot be read, or any
    /// error of [`BookCatalog::from_json`].
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse catalog from JSON string
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` for malformed JSON,
    /// `CatalogError::InvalidBook` for a record that breaks a book invariant,
    /// or any error of [`BookCatalog::load`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogFile = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            tracing::warn!(
                "Catalog version mismatch (expected {}, found {})",
                CATALOG_VERSION,
                data.version
            );
        }

        let records = data
            .books
            .into_iter()
            .map(|raw| {
                let id = raw.id.clone();
                BookRecord::try_from(raw).map_err(|source| CatalogError::InvalidBook { id, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::load(records)
    }

    fn add_book(&mut self, book: BookRecord) -> Result<(), CatalogError> {
        let index = self.books.len();

        if self.id_to_index.contains_key(book.id()) {
            return Err(CatalogError::DuplicateId(book.id().clone()));
        }

        for alias in book.aliases() {
            let key = normalize_key(alias);
            if let Some(&owner) = self.alias_to_index.get(&key) {
                // BookRecord already collapses its own duplicates
                return Err(CatalogError::AliasCollision {
                    alias: alias.clone(),
                    first: self.books[owner].id().clone(),
                    second: book.id().clone(),
                });
            }
            self.alias_to_index.insert(key.clone(), index);
            self.alias_order.push((key, index));
        }

        self.id_to_index.insert(book.id().clone(), index);
        self.books.push(book);
        Ok(())
    }

    /// Exact alias lookup after normalization (trim, collapse whitespace, lower-case)
    #[must_use]
    pub fn resolve_alias(&self, text: &str) -> Option<&BookRecord> {
        self.alias_to_index
            .get(&normalize_key(text))
            .map(|&idx| &self.books[idx])
    }

    /// Get a book by ID
    #[must_use]
    pub fn get(&self, id: &BookId) -> Option<&BookRecord> {
        self.id_to_index.get(id).map(|&idx| &self.books[idx])
    }

    /// Position of a book in canonical order
    #[must_use]
    pub fn position(&self, id: &BookId) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }

    /// All books in canonical order
    #[must_use]
    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    /// Normalized aliases with the book each belongs to, in catalog order
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &BookRecord)> + '_ {
        self.alias_order
            .iter()
            .map(|(alias, idx)| (alias.as_str(), &self.books[*idx]))
    }

    /// Number of distinct alias keys
    #[must_use]
    pub fn alias_count(&self) -> usize {
        self.alias_order.len()
    }

    /// Export catalog to JSON
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            books: self.books.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of books in catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Check if catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Testament;

    fn book(id: &str, name: &str, aliases: &[&str], chapters: u32) -> BookRecord {
        BookRecord::new(
            id,
            name,
            aliases.iter().map(|s| (*s).to_string()).collect(),
            Testament::Old,
            chapters,
        )
        .unwrap()
    }

    #[test]
    fn test_load_embedded_catalog() {
        let catalog = BookCatalog::load_embedded().unwrap();
        assert_eq!(catalog.len(), 66);
        assert!(catalog.alias_count() > 66);
    }

    #[test]
    fn test_catalog_get_by_id() {
        let catalog = BookCatalog::load_embedded().unwrap();

        let gen = catalog.get(&BookId::new("GEN")).unwrap();
        assert_eq!(gen.canonical_name(), "Kejadian");
        assert_eq!(gen.chapter_count(), 50);

        let mat = catalog.get(&BookId::new("MAT")).unwrap();
        assert_eq!(mat.chapter_count(), 28);
        assert_eq!(mat.testament(), Testament::New);
    }

    #[test]
    fn test_catalog_get_nonexistent() {
        let catalog = BookCatalog::load_embedded().unwrap();
        assert!(catalog.get(&BookId::new("XYZ")).is_none());
    }

    #[test]
    fn test_resolve_alias_normalizes() {
        let catalog = BookCatalog::load_embedded().unwrap();
        assert_eq!(
            catalog.resolve_alias("  1   KOR ").map(|b| b.id().as_str()),
            Some("1CO")
        );
        assert_eq!(
            catalog.resolve_alias("kej").map(|b| b.id().as_str()),
            Some("GEN")
        );
        assert!(catalog.resolve_alias("xyz").is_none());
        assert!(catalog.resolve_alias("").is_none());
    }

    #[test]
    fn test_positions_follow_canonical_order() {
        let catalog = BookCatalog::load_embedded().unwrap();
        let gen = catalog.position(&BookId::new("GEN")).unwrap();
        let exo = catalog.position(&BookId::new("EXO")).unwrap();
        let rev = catalog.position(&BookId::new("REV")).unwrap();
        assert!(gen < exo && exo < rev);
    }

    #[test]
    fn test_alias_collision_fails_loudly() {
        let records = vec![
            book("JDG", "Hakim-hakim", &["Jud"], 21),
            book("JUD", "Yudas", &["jud"], 1),
        ];
        match BookCatalog::load(records) {
            Err(CatalogError::AliasCollision { first, second, .. }) => {
                assert_eq!(first.as_str(), "JDG");
                assert_eq!(second.as_str(), "JUD");
            }
            other => panic!("expected alias collision, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(BookCatalog::load(vec![]), Err(CatalogError::Empty)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let records = vec![book("GEN", "Kejadian", &[], 50), book("GEN", "Genesis", &[], 50)];
        assert!(matches!(
            BookCatalog::load(records),
            Err(CatalogError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_zero_chapter_book_rejected_from_json() {
        let json = r#"{"version":"1.0.0","books":[
            {"id":"GEN","canonical_name":"Kejadian","aliases":["Kej"],"testament":"old","chapter_count":0}
        ]}"#;
        match BookCatalog::from_json(json) {
            Err(CatalogError::InvalidBook { id, source }) => {
                assert_eq!(id, "GEN");
                assert_eq!(source, BookError::ZeroChapters);
            }
            other => panic!("expected invalid book, got {other:?}"),
        }
    }

    #[test]
    fn test_catalog_to_json_round_trip() {
        let catalog = BookCatalog::load_embedded().unwrap();
        let json = catalog.to_json().unwrap();

        assert!(json.contains("\"version\""));
        assert!(json.contains("\"created_at\""));
        assert!(json.contains("Kejadian"));

        let reloaded = BookCatalog::from_json(&json).unwrap();
        assert_eq!(reloaded.len(), catalog.len());
        assert_eq!(reloaded.alias_count(), catalog.alias_count());
    }
}
