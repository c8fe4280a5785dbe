use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::catalog::store::BookCatalog;
use crate::cli::{load_catalog, OutputFormat};
use crate::core::book::BookRecord;
use crate::core::types::{BookId, Testament};

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List all books in the catalog
    List {
        /// Path to custom catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Filter by testament (old/new)
        #[arg(long)]
        testament: Option<Testament>,
    },

    /// Show details of a book, by ID or any alias
    Show {
        /// Book ID (e.g., "GEN") or alias (e.g., "Kej")
        #[arg(required = true)]
        id: String,

        /// Path to custom catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Export the catalog to a file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        /// Path to custom catalog file to export (defaults to embedded)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CatalogCommands::List { catalog, testament } => run_list(catalog, testament, format, verbose),
        CatalogCommands::Show { id, catalog } => run_show(&id, catalog, format),
        CatalogCommands::Export { output, catalog } => run_export(output, catalog),
    }
}

fn run_list(
    catalog_path: Option<PathBuf>,
    testament: Option<Testament>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog_path.as_deref())?;

    if verbose {
        eprintln!(
            "Loaded catalog with {} books and {} aliases",
            catalog.len(),
            catalog.alias_count()
        );
    }

    let filtered: Vec<&BookRecord> = catalog
        .books()
        .iter()
        .filter(|b| testament.map_or(true, |t| b.testament() == t))
        .collect();

    match format {
        OutputFormat::Text => {
            let name_width = filtered
                .iter()
                .map(|b| b.canonical_name().chars().count())
                .max()
                .unwrap_or(4)
                .max(4);

            println!("Book Catalog ({} books)\n", filtered.len());
            println!(
                "{:<5} {:<name_w$} {:<9} {:>8}  Aliases",
                "ID",
                "Name",
                "Testament",
                "Chapters",
                name_w = name_width
            );
            println!("{}", "-".repeat(5 + name_width + 9 + 8 + 4 + 30));

            for b in &filtered {
                let aliases = if verbose {
                    b.aliases().join(", ")
                } else {
                    truncate(&b.aliases().join(", "), 30)
                };
                println!(
                    "{:<5} {:<name_w$} {:<9} {:>8}  {}",
                    b.id(),
                    b.canonical_name(),
                    b.testament(),
                    b.chapter_count(),
                    aliases,
                    name_w = name_width
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = filtered
                .iter()
                .map(|b| {
                    serde_json::json!({
                        "id": b.id(),
                        "canonical_name": b.canonical_name(),
                        "testament": b.testament(),
                        "chapter_count": b.chapter_count(),
                        "alias_count": b.aliases().len(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tcanonical_name\ttestament\tchapter_count\taliases");
            for b in &filtered {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    b.id(),
                    b.canonical_name(),
                    b.testament(),
                    b.chapter_count(),
                    b.aliases().join(",")
                );
            }
        }
    }

    Ok(())
}

fn run_show(id: &str, catalog_path: Option<PathBuf>, format: OutputFormat) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog_path.as_deref())?;
    let book = find_book(&catalog, id).ok_or_else(|| anyhow::anyhow!("Book '{}' not found", id))?;

    match format {
        OutputFormat::Text => {
            println!("Book: {}\n", book.canonical_name());
            println!("ID:        {}", book.id());
            println!("Testament: {}", book.testament());
            println!("Chapters:  {}", book.chapter_count());
            if let Some(position) = catalog.position(book.id()) {
                println!("Position:  {} of {}", position + 1, catalog.len());
            }
            println!("\nAliases:");
            for alias in book.aliases() {
                println!("  {alias}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(book)?);
        }
        OutputFormat::Tsv => {
            println!("id\talias");
            for alias in book.aliases() {
                println!("{}\t{}", book.id(), alias);
            }
        }
    }

    Ok(())
}

fn run_export(output: PathBuf, catalog_path: Option<PathBuf>) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog_path.as_deref())?;

    let json = catalog.to_json()?;
    std::fs::write(&output, json)?;

    println!("Exported {} books to {}", catalog.len(), output.display());

    Ok(())
}

/// Look up by ID first (case-insensitive), then by alias
fn find_book<'c>(catalog: &'c BookCatalog, query: &str) -> Option<&'c BookRecord> {
    catalog
        .get(&BookId::new(query.trim().to_uppercase()))
        .or_else(|| catalog.resolve_alias(query))
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
