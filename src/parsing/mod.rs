//! Parsers for the engine's input sources.
//!
//! - **WhatsApp chat exports** ([`chat`]): iOS and Android layouts, multi-line
//!   messages, timestamps, system-message detection, context tags
//! - **Message filters** ([`filter`]): sender, date range, length and
//!   non-text selection over parsed chat messages
//! - **External extractor output** ([`external`]): JSON candidate arrays as
//!   produced by an LLM, possibly wrapped in Markdown fences or prose
//!
//! ## Example
//!
//! ```rust,no_run
//! use scripture_ref::parsing::chat::parse_chat_file;
//! use scripture_ref::parsing::external::parse_response;
//! use std::path::Path;
//!
//! let messages = parse_chat_file(Path::new("chat.txt")).unwrap();
//! let candidates = parse_response("```json\n[{\"book_text\": \"Kej\", \"start_chapter\": 1}]\n```");
//! ```

use thiserror::Error;

pub mod chat;
pub mod external;
pub mod filter;

/// Maximum number of messages accepted from one chat export
pub const MAX_MESSAGES: usize = 1_000_000;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Too many messages (limit {MAX_MESSAGES}, found at least {0})")]
    TooManyMessages(usize),
}
