//! Message selection for chat exports.
//!
//! A [`MessageFilter`] combines sender, date, length and content criteria;
//! a message is kept only if it passes all of them. The default filter keeps
//! every non-system message.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::parsing::chat::ChatMessage;

/// A message that is nothing but an attachment placeholder
static MEDIA_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:<.*?omitted>|<.*?tidak disertakan>|<(?:terlampir|attached):.*>)$").unwrap()
});

#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// Keep system messages (encryption notices, joins, media placeholders)
    pub include_system: bool,

    /// Keep only these senders; empty keeps everyone
    pub senders: Vec<String>,

    /// Drop these senders
    pub exclude_senders: Vec<String>,

    /// First day to keep, inclusive
    pub since: Option<NaiveDate>,

    /// Last day to keep, inclusive
    pub until: Option<NaiveDate>,

    /// Minimum text length in characters
    pub min_length: Option<usize>,

    /// Maximum text length in characters
    pub max_length: Option<usize>,

    /// Drop attachment placeholders and messages without letters or digits
    pub text_only: bool,
}

impl MessageFilter {
    /// True if `message` passes every criterion.
    ///
    /// Sender lists compare exact names. Once a date bound is set, messages
    /// whose timestamp did not parse are dropped.
    #[must_use]
    pub fn matches(&self, message: &ChatMessage) -> bool {
        if message.is_system && !self.include_system {
            return false;
        }

        let sender = message.sender.as_deref();
        if !self.senders.is_empty() && !sender.is_some_and(|s| self.senders.iter().any(|k| k == s)) {
            return false;
        }
        if sender.is_some_and(|s| self.exclude_senders.iter().any(|k| k == s)) {
            return false;
        }

        if self.since.is_some() || self.until.is_some() {
            let Some(day) = message.timestamp.map(|t| t.date()) else {
                return false;
            };
            if self.since.is_some_and(|since| day < since) || self.until.is_some_and(|until| day > until) {
                return false;
            }
        }

        let length = message.text.chars().count();
        if self.min_length.is_some_and(|min| length < min) || self.max_length.is_some_and(|max| length > max) {
            return false;
        }

        !(self.text_only && is_non_text(&message.text))
    }
}

/// Attachment placeholders and texts with no alphanumeric character
#[must_use]
pub fn is_non_text(text: &str) -> bool {
    let text = text.trim();
    MEDIA_ONLY.is_match(text) || !text.chars().any(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::chat::parse_chat_text;

    const EXPORT: &str = "28/02/24, 21:00 - Budi: Kej 1\n\
01/03/24, 07:15 - Budi: Sudah baca Kej 1-3\n\
01/03/24, 07:16 - Andi added Sari\n\
01/03/24, 07:20 - Sari: 🙏🙏\n\
02/03/24, 06:00 - Sari: <Media omitted>\n\
03/03/24, 05:30 - Andi: Mat 5 sampai 7, lalu lanjut Mat 8\n";

    fn kept(filter: &MessageFilter) -> Vec<usize> {
        let messages = parse_chat_text(EXPORT).unwrap();
        messages
            .iter()
            .enumerate()
            .filter(|(_, m)| filter.matches(m))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_default_filter_drops_system_messages() {
        assert_eq!(kept(&MessageFilter::default()), vec![0, 1, 3, 5]);

        let filter = MessageFilter {
            include_system: true,
            ..MessageFilter::default()
        };
        assert_eq!(kept(&filter), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_sender_filters() {
        let filter = MessageFilter {
            senders: vec!["Budi".to_string(), "Andi".to_string()],
            ..MessageFilter::default()
        };
        assert_eq!(kept(&filter), vec![0, 1, 5]);

        let filter = MessageFilter {
            exclude_senders: vec!["Budi".to_string()],
            ..MessageFilter::default()
        };
        assert_eq!(kept(&filter), vec![3, 5]);

        // Sender-less system lines never pass an include list
        let filter = MessageFilter {
            include_system: true,
            senders: vec!["Andi".to_string()],
            ..MessageFilter::default()
        };
        assert_eq!(kept(&filter), vec![5]);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let filter = MessageFilter {
            since: NaiveDate::from_ymd_opt(2024, 3, 1),
            until: NaiveDate::from_ymd_opt(2024, 3, 2),
            ..MessageFilter::default()
        };
        assert_eq!(kept(&filter), vec![1, 3]);

        let filter = MessageFilter {
            until: NaiveDate::from_ymd_opt(2024, 2, 28),
            ..MessageFilter::default()
        };
        assert_eq!(kept(&filter), vec![0]);
    }

    #[test]
    fn test_date_filter_drops_unparsed_timestamps() {
        let messages = parse_chat_text("31/02/24, 07:15 - Budi: Kej 1\n").unwrap();
        let filter = MessageFilter {
            since: NaiveDate::from_ymd_opt(2000, 1, 1),
            ..MessageFilter::default()
        };
        assert!(MessageFilter::default().matches(&messages[0]));
        assert!(!filter.matches(&messages[0]));
    }

    #[test]
    fn test_length_bounds_count_characters() {
        let filter = MessageFilter {
            min_length: Some(6),
            ..MessageFilter::default()
        };
        assert_eq!(kept(&filter), vec![1, 5]);

        // "🙏🙏" is two characters but eight bytes
        let filter = MessageFilter {
            max_length: Some(2),
            ..MessageFilter::default()
        };
        assert_eq!(kept(&filter), vec![3]);
    }

    #[test]
    fn test_text_only() {
        let filter = MessageFilter {
            include_system: true,
            text_only: true,
            ..MessageFilter::default()
        };
        assert_eq!(kept(&filter), vec![0, 1, 2, 5]);
    }

    #[test]
    fn test_is_non_text() {
        assert!(is_non_text("<Media omitted>"));
        assert!(is_non_text("<Media tidak disertakan>"));
        assert!(is_non_text("<attached: 00000012-PHOTO.jpg>"));
        assert!(is_non_text("  🙏 !! "));
        assert!(is_non_text(""));
        assert!(!is_non_text("Kej 1"));
        assert!(!is_non_text("Amin 🙏"));
    }
}
