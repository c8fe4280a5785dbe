//! WhatsApp chat export parsing.
//!
//! Two export layouts are recognized:
//!
//! ```text
//! [21/03/24 07.15.02] Budi: Sudah baca Kej 1-3      (iOS)
//! 21/03/24, 07:15 - Budi: Sudah baca Kej 1-3        (Android)
//! ```
//!
//! Lines that do not start a new message continue the previous one.
//! Non-system messages are tagged by length and content; see [`MessageTag`].

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::parsing::{ParseError, MAX_MESSAGES};
use crate::utils::text::{clean_text, remove_invisible_chars};

static IOS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\[(\d{1,2}/\d{1,2}/\d{2,4}),?\s+(\d{1,2}[.:]\d{2}[.:]\d{2})\]\s*~?\s*([^:]+):\s*(.*)$",
    )
    .unwrap()
});

static ANDROID_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}/\d{1,2}/\d{2,4}),\s+(\d{1,2}:\d{2})\s+-\s+(.+)$")
        .unwrap()
});

/// Notices that are system-generated whoever "sent" them
static NOTICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:messages and calls are end-to-end encrypted.*|pesan dan panggilan terenkripsi.*|this message was deleted\.?|you deleted this message\.?|pesan ini dihapus\.?|anda menghapus pesan ini\.?|<.*?omitted>|<.*?tidak disertakan>|<(?:terlampir|attached):.*>|.*\b(?:image|video|audio|sticker|gif|document) omitted)$",
    )
    .unwrap()
});

/// Group membership and settings changes; only trusted on sender-less lines
static GROUP_ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:.+ created group.*|.+ membuat grup.*|.+ added .+|.+ menambahkan .+|.+ changed .*|.+ mengubah .*|.+ removed .+|.+ mengeluarkan .+|.+ left|.+ keluar|.+ joined .*|.+ bergabung .*)$",
    )
    .unwrap()
});

/// Messages longer than this many characters are tagged [`MessageTag::Long`]
pub const LONG_MESSAGE_CHARS: usize = 200;

/// Mentions of an attachment anywhere in the text
static MEDIA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)omitted|tidak disertakan|terlampir|attached").unwrap());

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());

/// Context tags attached to non-system messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageTag {
    /// At most [`LONG_MESSAGE_CHARS`] characters
    Short,
    Long,
    Media,
    Url,
    Question,
}

impl std::fmt::Display for MessageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short => f.pad("SHORT"),
            Self::Long => f.pad("LONG"),
            Self::Media => f.pad("MEDIA"),
            Self::Url => f.pad("URL"),
            Self::Question => f.pad("QUESTION"),
        }
    }
}

/// Tags for a message text: exactly one of SHORT or LONG, then any of
/// MEDIA, URL and QUESTION, in that order
#[must_use]
pub fn message_tags(text: &str) -> Vec<MessageTag> {
    let mut tags = Vec::with_capacity(2);
    if text.chars().count() <= LONG_MESSAGE_CHARS {
        tags.push(MessageTag::Short);
    } else {
        tags.push(MessageTag::Long);
    }
    if MEDIA.is_match(text) {
        tags.push(MessageTag::Media);
    }
    if URL.is_match(text) {
        tags.push(MessageTag::Url);
    }
    if text.contains('?') {
        tags.push(MessageTag::Question);
    }
    tags
}

/// Export layout, detected from the first line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    #[must_use]
    pub fn detect(content: &str) -> Self {
        let first = content
            .lines()
            .map(remove_invisible_chars)
            .find(|l| !l.trim().is_empty())
            .unwrap_or_default();

        if first.trim_start().starts_with('[') {
            Self::Ios
        } else {
            Self::Android
        }
    }
}

/// One message of a chat export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub date: String,
    pub time: String,

    /// `None` when the date or time does not parse
    pub timestamp: Option<NaiveDateTime>,

    /// `None` for Android system lines, which carry no sender
    pub sender: Option<String>,

    pub text: String,
    pub is_system: bool,

    /// Empty for system messages
    pub tags: Vec<MessageTag>,
}

/// Parse a chat export file; invalid UTF-8 is replaced, not rejected
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or any error of
/// [`parse_chat_text`].
pub fn parse_chat_file(path: &Path) -> Result<Vec<ChatMessage>, ParseError> {
    let bytes = std::fs::read(path)?;
    parse_chat_text(&String::from_utf8_lossy(&bytes))
}

/// Parse chat export text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if no line starts a message, or
/// `ParseError::TooManyMessages` if the export exceeds [`MAX_MESSAGES`].
pub fn parse_chat_text(content: &str) -> Result<Vec<ChatMessage>, ParseError> {
    let platform = Platform::detect(content);
    let mut messages: Vec<ChatMessage> = Vec::new();
    let mut current: Option<ChatMessage> = None;

    for raw_line in content.lines() {
        let line = remove_invisible_chars(raw_line);

        if line.trim().is_empty() && current.is_none() {
            continue;
        }

        if let Some(message) = parse_line(&line, platform) {
            if let Some(done) = current.replace(message) {
                push_message(&mut messages, done)?;
            }
            continue;
        }

        if let Some(message) = current.as_mut() {
            message.text.push('\n');
            message.text.push_str(&clean_text(&line));
        }
    }

    if let Some(done) = current {
        push_message(&mut messages, done)?;
    }

    if messages.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No WhatsApp messages found (expected iOS or Android export layout)".to_string(),
        ));
    }

    tracing::debug!("Parsed {} {:?} chat messages", messages.len(), platform);

    Ok(messages)
}

/// True for encryption notices, deleted messages, media placeholders, and
/// sender-less group events
#[must_use]
pub fn is_system_message(sender: Option<&str>, text: &str) -> bool {
    let text = text.trim();
    NOTICE.is_match(text) || (sender.is_none() && (text.is_empty() || GROUP_ACTION.is_match(text)))
}

/// Distinct senders of non-system messages, sorted
#[must_use]
pub fn unique_senders(messages: &[ChatMessage]) -> Vec<&str> {
    let mut senders: Vec<&str> = messages
        .iter()
        .filter(|m| !m.is_system)
        .filter_map(|m| m.sender.as_deref())
        .collect();
    senders.sort_unstable();
    senders.dedup();
    senders
}

fn push_message(messages: &mut Vec<ChatMessage>, mut message: ChatMessage) -> Result<(), ParseError> {
    if messages.len() >= MAX_MESSAGES {
        return Err(ParseError::TooManyMessages(messages.len()));
    }
    message.text = message.text.trim_end().to_string();
    message.is_system = is_system_message(message.sender.as_deref(), &message.text);
    if !message.is_system {
        message.tags = message_tags(&message.text);
    }
    messages.push(message);
    Ok(())
}

fn parse_line(line: &str, platform: Platform) -> Option<ChatMessage> {
    let (date, time, sender, text) = match platform {
        Platform::Ios => {
            let caps = IOS_LINE.captures(line)?;
            (
                caps.get(1)?.as_str(),
                caps.get(2)?.as_str(),
                Some(caps.get(3)?.as_str()),
                caps.get(4)?.as_str(),
            )
        }
        Platform::Android => {
            let caps = ANDROID_LINE.captures(line)?;
            let content = caps.get(3)?.as_str();
            let (sender, text) = match content.split_once(':') {
                Some((sender, text)) => (Some(sender), text),
                None => (None, content),
            };
            (caps.get(1)?.as_str(), caps.get(2)?.as_str(), sender, text)
        }
    };

    Some(ChatMessage {
        date: date.to_string(),
        time: time.to_string(),
        timestamp: parse_timestamp(date, time),
        sender: sender.map(clean_text).filter(|s| !s.is_empty()),
        text: clean_text(text),
        is_system: false,
        tags: Vec::new(),
    })
}

/// Day-first dates with two- or four-digit years; `.` or `:` time separators
fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let year_len = date.rsplit('/').next().map_or(0, str::len);
    let date_format = if year_len == 4 { "%d/%m/%Y" } else { "%d/%m/%y" };
    let date = NaiveDate::parse_from_str(date, date_format).ok()?;

    let time = time.replace('.', ":");
    let time = NaiveTime::parse_from_str(&time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&time, "%H:%M"))
        .ok()?;

    Some(date.and_time(time))
}
