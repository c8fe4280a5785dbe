//! Centralized text normalization helpers.

/// Direction marks, zero-width characters and the BOM, as found in chat exports.
pub const INVISIBLE_CHARS: &[char] = &[
    '\u{200E}', // LRM
    '\u{200F}', // RLM
    '\u{202A}', // LRE
    '\u{202B}', // RLE
    '\u{202C}', // PDF
    '\u{202D}', // LRO
    '\u{202E}', // RLO
    '\u{200B}', // ZWSP
    '\u{200C}', // ZWNJ
    '\u{200D}', // ZWJ
    '\u{FEFF}', // BOM
];

/// Normalize a book name or alias into a lookup key.
///
/// Trims, collapses internal whitespace runs to a single space and lower-cases.
///
/// # Examples
///
/// ```
/// use scripture_ref::utils::text::normalize_key;
///
/// assert_eq!(normalize_key("  1   Korintus "), "1 korintus");
/// assert_eq!(normalize_key("KEJ"), "kej");
/// ```
#[must_use]
pub fn normalize_key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Remove invisible and control characters, keeping newlines and tabs.
#[must_use]
pub fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !INVISIBLE_CHARS.contains(c))
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Collapse horizontal whitespace and strip each line, preserving line breaks.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    lines.join("\n").trim_matches('\n').to_string()
}

/// Cleanup that is safe for every downstream consumer.
#[must_use]
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    normalize_whitespace(&remove_invisible_chars(text))
}

/// Maps byte offsets of a string to character offsets.
///
/// The regex engine reports byte offsets; everything this crate exposes is in
/// characters.
#[derive(Debug)]
pub struct OffsetMap {
    /// Byte offset of every char boundary, plus the total length
    boundaries: Vec<usize>,
}

impl OffsetMap {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { boundaries }
    }

    /// Character offset of a byte offset that lies on a char boundary.
    ///
    /// Offsets inside a multi-byte character map to the character that contains them.
    #[must_use]
    pub fn char_offset(&self, byte: usize) -> usize {
        match self.boundaries.binary_search(&byte) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }
}
