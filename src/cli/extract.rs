use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::{read_input, tsv_cell, EngineArgs, OutputFormat};
use crate::core::reference::{NerSpan, ResolvedReference};
use crate::matching::resolver::ResolutionCounts;

#[derive(Args)]
pub struct ExtractArgs {
    /// Messages to scan (each argument is one message)
    pub text: Vec<String>,

    /// Read messages from a file, one per line
    /// Use '-' for stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Emit BOOK/CHAPTER spans instead of resolved references
    #[arg(long)]
    pub spans: bool,

    /// Only report references whose chapters exist in the book
    #[arg(long)]
    pub valid_only: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Serialize)]
struct MessageReferences<'a> {
    message: &'a str,
    references: Vec<ResolvedReference>,
}

#[derive(Serialize)]
struct MessageSpans<'a> {
    message: &'a str,
    spans: Vec<NerSpan>,
}

pub fn run(args: ExtractArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let messages = collect_messages(&args)?;
    if messages.is_empty() {
        anyhow::bail!("No input text: pass messages as arguments or use --input");
    }

    let engine = args.engine.build_engine(verbose)?;

    if args.spans {
        let results: Vec<MessageSpans> = messages
            .iter()
            .map(|m| MessageSpans {
                message: m,
                spans: engine.extract_spans(m),
            })
            .collect();
        print_spans(&results, format)?;
    } else {
        let results: Vec<MessageReferences> = messages
            .iter()
            .map(|m| MessageReferences {
                message: m,
                references: engine
                    .extract(m)
                    .into_iter()
                    .filter(|r| r.is_valid || !args.valid_only)
                    .collect(),
            })
            .collect();
        print_references(&results, engine.stats(), format)?;
    }

    if verbose {
        let stats = engine.stats();
        eprintln!(
            "Resolutions: {} exact, {} fuzzy, {} failed",
            stats.exact, stats.fuzzy, stats.failed
        );
    }

    Ok(())
}

fn collect_messages(args: &ExtractArgs) -> anyhow::Result<Vec<String>> {
    let mut messages = args.text.clone();
    if let Some(path) = &args.input {
        let content = read_input(path)?;
        messages.extend(
            content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string),
        );
    }
    Ok(messages)
}

fn print_references(
    results: &[MessageReferences],
    stats: ResolutionCounts,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for (i, result) in results.iter().enumerate() {
                if results.len() > 1 {
                    println!("[{}] {}", i + 1, result.message);
                }
                if result.references.is_empty() {
                    println!("  (no references)");
                }
                for r in &result.references {
                    println!("  {}", describe(r));
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "messages": results,
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("message\tbook_id\tend_book_id\tstart_chapter\tend_chapter\tnormalized\tvalid\tmethod\tconfidence\traw_text");
            for (i, result) in results.iter().enumerate() {
                for r in &result.references {
                    println!(
                        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.3}\t{}",
                        i + 1,
                        r.book_id,
                        r.end_book_id.as_ref().map(ToString::to_string).unwrap_or_default(),
                        r.start_chapter,
                        r.end_chapter,
                        r.normalized_text,
                        r.is_valid,
                        r.resolution_method,
                        r.confidence,
                        tsv_cell(&r.raw_text)
                    );
                }
            }
        }
    }
    Ok(())
}

fn print_spans(results: &[MessageSpans], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for (i, result) in results.iter().enumerate() {
                if results.len() > 1 {
                    println!("[{}] {}", i + 1, result.message);
                }
                for span in &result.spans {
                    println!("  {:<7} {:>4}..{:<4} {}", span.label, span.start, span.end, span.text);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Tsv => {
            println!("message\tstart\tend\tlabel\ttext");
            for (i, result) in results.iter().enumerate() {
                for span in &result.spans {
                    println!(
                        "{}\t{}\t{}\t{}\t{}",
                        i + 1,
                        span.start,
                        span.end,
                        span.label,
                        tsv_cell(&span.text)
                    );
                }
            }
        }
    }
    Ok(())
}

/// One-line human summary of a reference
pub(crate) fn describe(r: &ResolvedReference) -> String {
    let mut line = format!(
        "{:<28} {:<5} {:.2}  \"{}\"",
        r.normalized_text, r.resolution_method, r.confidence, r.raw_text
    );
    if !r.is_valid {
        line.push_str("  (invalid chapter range)");
    }
    line
}
