//! Command-line interface for scripture-ref.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **extract**: Extract references (or NER spans) from messages
//! - **annotate**: Weakly label every message of a WhatsApp chat export
//! - **normalize**: Resolve and validate external extractor output
//! - **catalog**: List, show, or export books from the catalog
//! - **serve**: Start the HTTP API
//!
//! ## Usage
//!
//! ```text
//! # Extract from arguments
//! scripture-ref extract "Sudah baca Kej 1-3" "Mat 5 sampai 7"
//!
//! # One message per line from stdin, as JSON
//! cat messages.txt | scripture-ref --format json extract --input -
//!
//! # Label a chat export, one sender from March on
//! scripture-ref --format tsv annotate chat.txt --sender Budi --since 2024-03-01
//!
//! # Start the API
//! scripture-ref serve --port 8080
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::catalog::store::BookCatalog;
use crate::matching::engine::{EngineConfig, ReferenceEngine};

pub mod annotate;
pub mod catalog;
pub mod extract;
pub mod normalize;

#[derive(Parser)]
#[command(name = "scripture-ref")]
#[command(version)]
#[command(about = "Extract and normalize scripture references from chat text")]
#[command(
    long_about = "scripture-ref finds scripture references such as \"Kej 1-3\" or \"Kejadian 50 sampai Keluaran 2\" in noisy, multilingual chat messages.\n\nBook names are resolved against a catalog of canonical books and aliases:\n- Exact alias matches first\n- Fuzzy matches for typos\n- Chapter ranges validated against each book's chapter count"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract references from messages
    Extract(extract::ExtractArgs),

    /// Label every message of a WhatsApp chat export
    Annotate(annotate::AnnotateArgs),

    /// Resolve and validate external extractor output
    Normalize(normalize::NormalizeArgs),

    /// Inspect the book catalog
    Catalog(catalog::CatalogArgs),

    /// Start the HTTP API
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Catalog and engine options shared by every command that runs the engine
#[derive(clap::Args, Clone, Debug, Default)]
pub struct EngineArgs {
    /// Path to custom catalog file
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum fuzzy similarity (0-100) for book names
    #[arg(long)]
    pub fuzzy_threshold: Option<f64>,

    /// Disable the loose fallback for book names outside the alias list
    #[arg(long)]
    pub no_loose: bool,
}

impl EngineArgs {
    /// Load the catalog and build the engine, applying flag overrides on top of `--config`
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or config cannot be loaded, or if the
    /// resulting configuration is rejected by the engine.
    pub fn build_engine(&self, verbose: bool) -> anyhow::Result<ReferenceEngine> {
        let catalog = load_catalog(self.catalog.as_deref())?;
        if verbose {
            eprintln!(
                "Loaded catalog with {} books and {} aliases",
                catalog.len(),
                catalog.alias_count()
            );
        }

        let mut config = match &self.config {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str::<EngineConfig>(&content)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => EngineConfig::default(),
        };
        if let Some(threshold) = self.fuzzy_threshold {
            config.fuzzy_threshold = threshold;
        }
        if self.no_loose {
            config.loose_fallback = false;
        }

        Ok(ReferenceEngine::with_config(Arc::new(catalog), config)?)
    }
}

/// Load a catalog from a file, or the embedded one
///
/// # Errors
///
/// Returns an error if the catalog file cannot be read or is invalid.
pub fn load_catalog(path: Option<&Path>) -> anyhow::Result<BookCatalog> {
    let catalog = match path {
        Some(path) => BookCatalog::load_from_file(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => BookCatalog::load_embedded()?,
    };
    Ok(catalog)
}

/// Read a whole input file, or stdin for `-`
///
/// # Errors
///
/// Returns an error if the input cannot be read.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        Ok(content)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Collapse tabs and newlines so a value fits one TSV cell
pub(crate) fn tsv_cell(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
