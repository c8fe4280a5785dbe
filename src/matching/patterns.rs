//! Compile the catalog's aliases into the ordered reference patterns.
//!
//! Patterns are ordered from most to least specific. The span matcher accepts
//! matches greedily in this order, so richer structures (cross-book ranges)
//! claim their text before simpler ones (single chapters) can.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::store::BookCatalog;

/// Range words accepted between two chapters when none are configured
pub const DEFAULT_RANGE_WORDS: &[&str] = &["sampai", "sampe", "hingga", "to"];

/// Number of alias-based patterns, excluding the loose fallback
pub const RULE_PATTERN_COUNT: usize = 5;

/// Capture group names shared by all patterns
pub(crate) const GROUP_BOOK: &str = "b1";
pub(crate) const GROUP_CHAPTER: &str = "c1";
pub(crate) const GROUP_TAIL: &str = "t1";
pub(crate) const GROUP_END_BOOK: &str = "b2";
pub(crate) const GROUP_END_CHAPTER: &str = "c2";

/// The compiled union of every alias is large; the default limit is too tight
const REGEX_SIZE_LIMIT: usize = 64 * (1 << 20);

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("No aliases to build patterns from")]
    NoAliases,

    #[error("No range words configured")]
    NoRangeWords,

    #[error("Failed to compile pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// Shape of reference a pattern recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// `Kej 50 - Kel 2`
    CrossBookDash,
    /// `Kej 50 sampai Kel 2`
    CrossBookWords,
    /// `Kej 1-3`
    RangeDash,
    /// `Kej 1 sampai 3`
    RangeWords,
    /// `Kej 1`
    SingleChapter,
    /// `Kejadiaan 3`: any word followed by a chapter, resolved fuzzily
    Loose,
}

impl PatternKind {
    /// Number of semantic capture groups (books and chapters)
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::CrossBookDash | Self::CrossBookWords => 4,
            Self::RangeDash | Self::RangeWords | Self::Loose => 3,
            Self::SingleChapter => 2,
        }
    }

    #[must_use]
    pub fn is_cross_book(self) -> bool {
        matches!(self, Self::CrossBookDash | Self::CrossBookWords)
    }

    /// True for patterns built from catalog aliases
    #[must_use]
    pub fn is_rule(self) -> bool {
        !matches!(self, Self::Loose)
    }
}

/// A compiled pattern with the shape it recognizes
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    kind: PatternKind,
    regex: Regex,
}

impl CompiledPattern {
    #[must_use]
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.kind.arity()
    }

    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Ordered, immutable pattern list: five alias patterns, then the optional fallback
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    /// Every pattern in priority order
    #[must_use]
    pub fn all(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// The five alias-based patterns in priority order
    #[must_use]
    pub fn rule_patterns(&self) -> &[CompiledPattern] {
        &self.patterns[..RULE_PATTERN_COUNT]
    }

    /// The loose fallback pattern, if enabled
    #[must_use]
    pub fn fallback(&self) -> Option<&CompiledPattern> {
        self.patterns.get(RULE_PATTERN_COUNT)
    }
}

/// Builds a [`PatternSet`] from aliases and range words
#[derive(Debug, Clone)]
pub struct PatternCompiler {
    range_words: Vec<String>,
    loose_fallback: bool,
}

impl Default for PatternCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_RANGE_WORDS.iter().map(|w| (*w).to_string()).collect())
    }
}

impl PatternCompiler {
    #[must_use]
    pub fn new(range_words: Vec<String>) -> Self {
        Self {
            range_words,
            loose_fallback: false,
        }
    }

    /// Append the loose `WORD CH` fallback after the alias patterns
    #[must_use]
    pub fn with_loose_fallback(mut self, enabled: bool) -> Self {
        self.loose_fallback = enabled;
        self
    }

    /// Compile patterns from every alias in the catalog
    ///
    /// # Errors
    ///
    /// See [`PatternCompiler::compile_aliases`].
    pub fn compile(&self, catalog: &BookCatalog) -> Result<PatternSet, CompileError> {
        self.compile_aliases(catalog.books().iter().flat_map(|b| b.aliases()))
    }

    /// Compile patterns from an explicit alias list
    ///
    /// # Errors
    ///
    /// Returns `CompileError::NoAliases` if no non-blank alias is given,
    /// `CompileError::NoRangeWords` if the range word list is empty, or
    /// `CompileError::Regex` if the regex engine rejects a pattern.
    pub fn compile_aliases<I, S>(&self, aliases: I) -> Result<PatternSet, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alias_union = alternation(aliases.into_iter().map(|a| alias_pattern(a.as_ref())))
            .ok_or(CompileError::NoAliases)?;
        let words = alternation(self.range_words.iter().map(|w| regex::escape(w.trim())))
            .ok_or(CompileError::NoRangeWords)?;

        let book = |group: &str| {
            format!(r"[_*:(\[]{{0,2}}(?P<{group}>{alias_union})\.?[_*)\]]{{0,2}}")
        };
        let chapter = |group: &str| format!(r"(?P<{group}>[0-9]+)");
        let dash = r"\s*[-–—]{1,2}\s*";
        let range_words = format!(r"\s+(?:{words})\s+");

        let b1 = book(GROUP_BOOK);
        let b2 = book(GROUP_END_BOOK);
        let c1 = chapter(GROUP_CHAPTER);
        let c2 = chapter(GROUP_END_CHAPTER);
        let tail = format!("(?:{dash}{})?", chapter(GROUP_TAIL));

        let mut sources = vec![
            (
                PatternKind::CrossBookDash,
                format!(r"{b1}\s*{c1}{tail}{dash}{b2}\s*{c2}"),
            ),
            (
                PatternKind::CrossBookWords,
                format!(r"{b1}\s*{c1}{tail}{range_words}{b2}\s*{c2}"),
            ),
            (PatternKind::RangeDash, format!(r"{b1}\s*{c1}{dash}{c2}")),
            (PatternKind::RangeWords, format!(r"{b1}\s*{c1}{range_words}{c2}")),
            (PatternKind::SingleChapter, format!(r"{b1}\s*{c1}")),
        ];

        if self.loose_fallback {
            sources.push((
                PatternKind::Loose,
                format!(
                    r"(?P<{GROUP_BOOK}>(?:[1-3][ \t]?)?[A-Za-z][A-Za-z\-]+)\.?\s+{c1}(?:{dash}{c2})?"
                ),
            ));
        }

        let patterns = sources
            .into_iter()
            .map(|(kind, source)| {
                let regex = RegexBuilder::new(&source)
                    .case_insensitive(true)
                    .size_limit(REGEX_SIZE_LIMIT)
                    .build()?;
                Ok(CompiledPattern { kind, regex })
            })
            .collect::<Result<Vec<_>, CompileError>>()?;

        tracing::debug!("Compiled {} reference patterns", patterns.len());

        Ok(PatternSet { patterns })
    }
}

/// Escaped alias with flexible internal whitespace
fn alias_pattern(alias: &str) -> String {
    alias
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Longest-first alternation so a longer alias wins over a prefix-sharing shorter one
fn alternation<I: Iterator<Item = String>>(items: I) -> Option<String> {
    let mut items: Vec<String> = items.filter(|s| !s.is_empty()).collect();
    items.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    items.dedup();

    if items.is_empty() {
        None
    } else {
        Some(items.join("|"))
    }
}
