//! Shared helpers: text cleanup, key normalization and offset conversion.

pub mod text;
