use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{BookId, Testament};
use crate::utils::text::normalize_key;

/// Why a single book record was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("book id is blank")]
    BlankId,

    #[error("canonical name is blank")]
    BlankName,

    #[error("alias #{0} is blank")]
    BlankAlias(usize),

    #[error("chapter count must be at least 1")]
    ZeroChapters,
}

/// Raw book data as stored in a catalog file
#[derive(Debug, Clone, Deserialize)]
pub struct BookData {
    pub id: String,
    pub canonical_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub testament: Testament,
    pub chapter_count: u32,
}

/// A canonical book in the catalog.
///
/// Immutable once built. The alias list always contains the canonical name and
/// holds no two aliases with the same normalized key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookData")]
pub struct BookRecord {
    id: BookId,
    canonical_name: String,
    aliases: Vec<String>,
    testament: Testament,
    chapter_count: u32,
}

impl BookRecord {
    /// Build a validated record.
    ///
    /// # Errors
    ///
    /// Returns a [`BookError`] if the id, name or an alias is blank, or if
    /// `chapter_count` is zero.
    pub fn new(
        id: impl Into<String>,
        canonical_name: impl Into<String>,
        aliases: Vec<String>,
        testament: Testament,
        chapter_count: u32,
    ) -> Result<Self, BookError> {
        let id = id.into().trim().to_string();
        let canonical_name = canonical_name.into().trim().to_string();

        if id.is_empty() {
            return Err(BookError::BlankId);
        }
        if canonical_name.is_empty() {
            return Err(BookError::BlankName);
        }
        if chapter_count < 1 {
            return Err(BookError::ZeroChapters);
        }

        let mut seen = std::collections::HashSet::new();
        let mut kept = Vec::with_capacity(aliases.len() + 1);

        // Canonical name first when the source list does not carry it
        let name_key = normalize_key(&canonical_name);
        if !aliases.iter().any(|a| normalize_key(a) == name_key) {
            seen.insert(name_key);
            kept.push(canonical_name.clone());
        }

        for (i, alias) in aliases.into_iter().enumerate() {
            let key = normalize_key(&alias);
            if key.is_empty() {
                return Err(BookError::BlankAlias(i));
            }
            if seen.insert(key) {
                kept.push(alias.trim().to_string());
            }
        }

        Ok(Self {
            id: BookId::new(id),
            canonical_name,
            aliases: kept,
            testament,
            chapter_count,
        })
    }

    #[must_use]
    pub fn id(&self) -> &BookId {
        &self.id
    }

    #[must_use]
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    /// Surface forms in source order (canonical name included)
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    #[must_use]
    pub fn testament(&self) -> Testament {
        self.testament
    }

    #[must_use]
    pub fn chapter_count(&self) -> u32 {
        self.chapter_count
    }
}

impl TryFrom<BookData> for BookRecord {
    type Error = BookError;

    fn try_from(data: BookData) -> Result<Self, Self::Error> {
        Self::new(
            data.id,
            data.canonical_name,
            data.aliases,
            data.testament,
            data.chapter_count,
        )
    }
}
