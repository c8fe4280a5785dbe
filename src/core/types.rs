use serde::{Deserialize, Serialize};

/// Stable identifier for a book in the catalog (e.g. `"GEN"`, `"1CO"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub String);

impl BookId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Which testament a book belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Testament {
    Old,
    New,
}

impl std::fmt::Display for Testament {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Old => f.pad("OLD"),
            Self::New => f.pad("NEW"),
        }
    }
}

impl std::str::FromStr for Testament {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" | "ot" | "pl" => Ok(Self::Old),
            "new" | "nt" | "pb" => Ok(Self::New),
            other => Err(format!("unknown testament '{other}'")),
        }
    }
}

/// Which resolution stage produced a book match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionMethod {
    /// Normalized text is a known alias
    Exact,
    /// Best alias by similarity ratio cleared the threshold
    Fuzzy,
    /// Neither stage produced a book
    Failed,
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => f.pad("EXACT"),
            Self::Fuzzy => f.pad("FUZZY"),
            Self::Failed => f.pad("FAILED"),
        }
    }
}

/// Where a reference candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceSource {
    /// The built-in pattern matcher
    Rule,
    /// An external extractor (e.g. an LLM) via `normalize`
    External,
}

impl std::fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rule => f.pad("RULE"),
            Self::External => f.pad("EXTERNAL"),
        }
    }
}

/// Label of a sequence-labeling span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpanLabel {
    Book,
    Chapter,
}

impl std::fmt::Display for SpanLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Book => f.pad("BOOK"),
            Self::Chapter => f.pad("CHAPTER"),
        }
    }
}

/// Half-open character interval `[start, end)` into a source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True if the two intervals share at least one position
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
