//! Greedy, priority-ordered, non-overlapping span selection.

use regex::Captures;

use crate::core::types::Span;
use crate::matching::patterns::{
    CompiledPattern, PatternKind, GROUP_BOOK, GROUP_CHAPTER, GROUP_END_BOOK, GROUP_END_CHAPTER,
    GROUP_TAIL,
};
use crate::utils::text::OffsetMap;

/// A captured piece of the source text, in character offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TextSpan {
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Chapter value of a digit capture; values beyond `u32::MAX` saturate
    #[must_use]
    pub fn chapter(&self) -> u32 {
        self.text.parse().unwrap_or(u32::MAX)
    }

    /// Chapter digits without leading zeros, exact even where [`chapter`](Self::chapter) saturates
    #[must_use]
    pub fn chapter_digits(&self) -> &str {
        match self.text.trim_start_matches('0') {
            "" if !self.text.is_empty() => "0",
            digits => digits,
        }
    }
}

/// A raw match accepted by the span matcher, before book resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub kind: PatternKind,

    /// Whole match, markup included
    pub span: Span,
    pub raw_text: String,

    pub book: TextSpan,
    pub start_chapter: TextSpan,

    /// In-book range suffix on the start side of a cross-book match
    pub start_tail: Option<TextSpan>,

    pub end_book: Option<TextSpan>,
    pub end_chapter: Option<TextSpan>,
}

impl MatchCandidate {
    #[must_use]
    pub fn start_value(&self) -> u32 {
        self.start_chapter.chapter()
    }

    /// End chapter; a single chapter ends where it starts
    #[must_use]
    pub fn end_value(&self) -> u32 {
        self.end_chapter
            .as_ref()
            .map_or_else(|| self.start_value(), TextSpan::chapter)
    }
}

/// Runs compiled patterns over a text and keeps the first claim on every character
pub struct SpanMatcher<'p> {
    patterns: &'p [CompiledPattern],
}

impl<'p> SpanMatcher<'p> {
    #[must_use]
    pub fn new(patterns: &'p [CompiledPattern]) -> Self {
        Self { patterns }
    }

    /// Find all accepted matches, ordered by start offset.
    ///
    /// Patterns are applied in priority order. A match overlapping any
    /// previously accepted match is discarded, so earlier patterns permanently
    /// block later ones on shared text.
    #[must_use]
    pub fn find_matches(&self, text: &str) -> Vec<MatchCandidate> {
        let offsets = OffsetMap::new(text);
        // Byte ranges of accepted matches
        let mut accepted: Vec<(usize, usize)> = Vec::new();
        let mut candidates = Vec::new();

        for pattern in self.patterns {
            for caps in captures_iter(pattern, text) {
                let Some(whole) = caps.get(0) else { continue };
                let (start, end) = (whole.start(), whole.end());

                if accepted.iter().any(|&(s, e)| start < e && s < end) {
                    continue;
                }

                match build_candidate(pattern.kind(), &caps, &offsets) {
                    Some(candidate) => {
                        tracing::debug!(
                            "Accepted {:?} match '{}' at {}..{}",
                            candidate.kind,
                            candidate.raw_text,
                            candidate.span.start,
                            candidate.span.end
                        );
                        accepted.push((start, end));
                        candidates.push(candidate);
                    }
                    None => {
                        tracing::warn!(
                            "Pattern {:?} matched without its required groups",
                            pattern.kind()
                        );
                    }
                }
            }
        }

        candidates.sort_by_key(|c| c.span.start);
        candidates
    }
}

/// Non-overlapping matches of one pattern, skipping any match that starts
/// right after an ASCII letter and rescanning from the next character
fn captures_iter<'t>(pattern: &CompiledPattern, text: &'t str) -> Vec<Captures<'t>> {
    let regex = pattern.regex();
    let mut found = Vec::new();
    let mut pos = 0;

    while pos <= text.len() {
        let Some(caps) = regex.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else { break };

        if preceded_by_letter(text, whole.start()) {
            pos = next_char_boundary(text, whole.start());
            continue;
        }

        pos = if whole.end() > whole.start() {
            whole.end()
        } else {
            next_char_boundary(text, whole.end())
        };
        found.push(caps);
    }

    found
}

fn preceded_by_letter(text: &str, byte: usize) -> bool {
    text[..byte]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_alphabetic())
}

fn next_char_boundary(text: &str, byte: usize) -> usize {
    text[byte..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| byte + c.len_utf8())
}

fn group(caps: &Captures<'_>, name: &str, offsets: &OffsetMap) -> Option<TextSpan> {
    caps.name(name).map(|m| TextSpan {
        start: offsets.char_offset(m.start()),
        end: offsets.char_offset(m.end()),
        text: m.as_str().to_string(),
    })
}

fn build_candidate(
    kind: PatternKind,
    caps: &Captures<'_>,
    offsets: &OffsetMap,
) -> Option<MatchCandidate> {
    let whole = caps.get(0)?;
    let book = group(caps, GROUP_BOOK, offsets)?;
    let start_chapter = group(caps, GROUP_CHAPTER, offsets)?;
    let start_tail = group(caps, GROUP_TAIL, offsets);
    let end_book = group(caps, GROUP_END_BOOK, offsets);
    let end_chapter = group(caps, GROUP_END_CHAPTER, offsets);

    let complete = match kind {
        PatternKind::CrossBookDash | PatternKind::CrossBookWords => {
            end_book.is_some() && end_chapter.is_some()
        }
        PatternKind::RangeDash | PatternKind::RangeWords => end_chapter.is_some(),
        PatternKind::SingleChapter | PatternKind::Loose => true,
    };
    if !complete {
        return None;
    }

    Some(MatchCandidate {
        kind,
        span: Span::new(
            offsets.char_offset(whole.start()),
            offsets.char_offset(whole.end()),
        ),
        raw_text: whole.as_str().to_string(),
        book,
        start_chapter,
        start_tail,
        end_book,
        end_chapter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::patterns::{PatternCompiler, PatternSet};

    fn patterns(loose: bool) -> PatternSet {
        PatternCompiler::default()
            .with_loose_fallback(loose)
            .compile_aliases(["Kej", "Kejadian", "Kel", "Keluaran", "Mat", "Matius", "Yoh"])
            .unwrap()
    }

    #[test]
    fn test_single_chapter() {
        let set = patterns(false);
        let found = SpanMatcher::new(set.all()).find_matches("baca Kej 1 ya");
        assert_eq!(found.len(), 1);
        let m = &found[0];
        assert_eq!(m.kind, PatternKind::SingleChapter);
        assert_eq!(m.span, Span::new(5, 10));
        assert_eq!(m.book.text, "Kej");
        assert_eq!(m.start_value(), 1);
        assert_eq!(m.end_value(), 1);
    }

    #[test]
    fn test_range_wins_over_single() {
        let set = patterns(false);
        let found = SpanMatcher::new(set.all()).find_matches("Kej 1-3");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::RangeDash);
        assert_eq!(found[0].end_value(), 3);
    }

    #[test]
    fn test_cross_book_blocks_later_patterns() {
        let set = patterns(false);
        let found =
            SpanMatcher::new(set.all()).find_matches("Kejadian 1-3 sampai Keluaran 2");
        assert_eq!(found.len(), 1);
        let m = &found[0];
        assert_eq!(m.kind, PatternKind::CrossBookWords);
        assert_eq!(m.start_tail.as_ref().map(TextSpan::chapter), Some(3));
        assert_eq!(m.end_book.as_ref().map(|b| b.text.as_str()), Some("Keluaran"));
        assert_eq!(m.end_value(), 2);
    }

    #[test]
    fn test_rejects_match_inside_word() {
        let set = patterns(false);
        // "Kej" inside "Takej" must not match, but "Mat 5" still does
        let found = SpanMatcher::new(set.all()).find_matches("Takej 1 lalu Mat 5");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].book.text, "Mat");
    }

    #[test]
    fn test_letter_guard_rescans_next_character() {
        let set = patterns(false);
        // Leading markup after a letter: the '*' start is rejected, the 'M' start is not
        let found = SpanMatcher::new(set.all()).find_matches("x*Mat 5");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_text, "Mat 5");
    }

    #[test]
    fn test_no_separator_between_book_and_chapter() {
        let set = patterns(false);
        let found = SpanMatcher::new(set.all()).find_matches("kej1");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].book.text, "kej");
        assert_eq!(found[0].start_value(), 1);
    }

    #[test]
    fn test_output_sorted_and_non_overlapping() {
        let set = patterns(true);
        let found = SpanMatcher::new(set.all())
            .find_matches("Yoh 3, Kej 1-2, Kejadiaan 4 dan Mat 5 sampai 7");
        let starts: Vec<_> = found.iter().map(|m| m.span.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);

        for (i, a) in found.iter().enumerate() {
            for b in &found[i + 1..] {
                assert!(!a.span.overlaps(&b.span), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_loose_fallback_catches_unknown_word() {
        let set = patterns(true);
        let found = SpanMatcher::new(set.all()).find_matches("Kej 1 lalu Xyz 5");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, PatternKind::SingleChapter);
        assert_eq!(found[1].kind, PatternKind::Loose);
        assert_eq!(found[1].book.text, "Xyz");
    }

    #[test]
    fn test_char_offsets_with_multibyte_text() {
        let set = patterns(false);
        let text = "— 🙏 Yoh 3";
        let found = SpanMatcher::new(set.all()).find_matches(text);
        assert_eq!(found.len(), 1);
        let m = &found[0];
        let chars: Vec<char> = text.chars().collect();
        let extracted: String = chars[m.span.start..m.span.end].iter().collect();
        assert_eq!(extracted, "Yoh 3");
        assert_eq!(m.book.start, 4);
    }

    #[test]
    fn test_chapter_overflow_saturates() {
        let set = patterns(false);
        let found = SpanMatcher::new(set.all()).find_matches("Mat 99999999999");
        assert_eq!(found[0].start_value(), u32::MAX);
        assert_eq!(found[0].start_chapter.chapter_digits(), "99999999999");
    }

    #[test]
    fn test_chapter_digits_strip_leading_zeros() {
        let span = |text: &str| TextSpan {
            start: 0,
            end: text.len(),
            text: text.to_string(),
        };
        assert_eq!(span("007").chapter_digits(), "7");
        assert_eq!(span("000").chapter_digits(), "0");
        assert_eq!(span("12").chapter_digits(), "12");
    }
}
