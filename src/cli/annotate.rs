use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;
use rayon::prelude::*;
use serde::Serialize;

use crate::cli::extract::describe;
use crate::cli::{tsv_cell, EngineArgs, OutputFormat};
use crate::core::reference::{NerSpan, ResolvedReference};
use crate::matching::engine::ReferenceEngine;
use crate::matching::resolver::ResolutionCounts;
use crate::parsing::chat::{parse_chat_file, unique_senders, ChatMessage, MessageTag};
use crate::parsing::filter::MessageFilter;

#[derive(Args)]
pub struct AnnotateArgs {
    /// WhatsApp chat export (.txt)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Also annotate system messages (encryption notices, joins, media)
    #[arg(long)]
    pub include_system: bool,

    /// Only output messages with at least one reference
    #[arg(long)]
    pub labeled_only: bool,

    /// Only annotate messages from this sender (repeatable)
    #[arg(long = "sender", value_name = "NAME")]
    pub senders: Vec<String>,

    /// Skip messages from this sender (repeatable)
    #[arg(long = "exclude-sender", value_name = "NAME")]
    pub exclude_senders: Vec<String>,

    /// First day to annotate, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Last day to annotate, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,

    /// Skip messages shorter than this many characters
    #[arg(long)]
    pub min_length: Option<usize>,

    /// Skip messages longer than this many characters
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Skip attachment placeholders and messages without letters or digits
    #[arg(long)]
    pub text_only: bool,

    /// Print the export's distinct senders and exit
    #[arg(long)]
    pub list_senders: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl AnnotateArgs {
    /// # Errors
    ///
    /// Returns an error if `--since` is after `--until` or `--min-length`
    /// exceeds `--max-length`.
    pub fn message_filter(&self) -> anyhow::Result<MessageFilter> {
        if let (Some(since), Some(until)) = (self.since, self.until) {
            anyhow::ensure!(since <= until, "--since {since} is after --until {until}");
        }
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            anyhow::ensure!(min <= max, "--min-length {min} exceeds --max-length {max}");
        }

        Ok(MessageFilter {
            include_system: self.include_system,
            senders: self.senders.clone(),
            exclude_senders: self.exclude_senders.clone(),
            since: self.since,
            until: self.until,
            min_length: self.min_length,
            max_length: self.max_length,
            text_only: self.text_only,
        })
    }
}

/// Weak labels for one chat message
#[derive(Debug, Serialize)]
pub struct MessageAnnotation {
    /// Position in the export, counting system messages
    pub index: usize,
    pub timestamp: Option<NaiveDateTime>,
    pub sender: Option<String>,
    pub text: String,
    pub tags: Vec<MessageTag>,
    pub references: Vec<ResolvedReference>,
    pub ner_spans: Vec<NerSpan>,
    pub ref_count: usize,
    pub is_progress_report: bool,
}

#[derive(Debug, Serialize)]
pub struct AnnotationSummary {
    /// Messages in the export
    pub messages: usize,
    pub system_skipped: usize,
    /// Non-system messages rejected by the filter
    pub filtered_out: usize,
    pub labeled: usize,
    pub references: usize,
    pub invalid_references: usize,
    /// Annotated messages carrying each tag
    pub tags: BTreeMap<MessageTag, usize>,
    pub stats: ResolutionCounts,
}

impl AnnotationSummary {
    /// Share of annotated messages carrying `tag`, 0.0 to 100.0
    #[must_use]
    pub fn tag_percentage(&self, tag: MessageTag) -> f64 {
        let annotated = self.messages - self.system_skipped - self.filtered_out;
        match self.tags.get(&tag) {
            Some(&count) if annotated > 0 => count as f64 * 100.0 / annotated as f64,
            _ => 0.0,
        }
    }
}

pub fn run(args: AnnotateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let messages = parse_chat_file(&args.input)
        .with_context(|| format!("Failed to parse chat export {}", args.input.display()))?;

    if verbose {
        eprintln!("Parsed {} messages from {}", messages.len(), args.input.display());
    }

    if args.list_senders {
        let senders = unique_senders(&messages);
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&senders)?),
            OutputFormat::Text | OutputFormat::Tsv => {
                for sender in senders {
                    println!("{}", tsv_cell(sender));
                }
            }
        }
        return Ok(());
    }

    let filter = args.message_filter()?;
    let engine = args.engine.build_engine(verbose)?;
    let (annotations, summary) = annotate_messages(&engine, &messages, &filter);

    if verbose {
        eprintln!(
            "Annotated {} messages ({} system skipped, {} filtered out)",
            annotations.len(),
            summary.system_skipped,
            summary.filtered_out
        );
    }

    let shown: Vec<&MessageAnnotation> = annotations
        .iter()
        .filter(|a| a.is_progress_report || !args.labeled_only)
        .collect();

    match format {
        OutputFormat::Text => print_text(&shown, &summary),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "annotations": shown,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => print_tsv(&shown),
    }

    Ok(())
}

/// Run the engine over every message `filter` keeps, in parallel, keeping
/// export order and export indices
pub fn annotate_messages(
    engine: &ReferenceEngine,
    messages: &[ChatMessage],
    filter: &MessageFilter,
) -> (Vec<MessageAnnotation>, AnnotationSummary) {
    let annotations: Vec<MessageAnnotation> = messages
        .par_iter()
        .enumerate()
        .filter(|(_, m)| filter.matches(m))
        .map(|(index, message)| {
            let references = engine.extract(&message.text);
            let ner_spans = engine.extract_spans(&message.text);
            let ref_count = references.len();
            MessageAnnotation {
                index,
                timestamp: message.timestamp,
                sender: message.sender.clone(),
                text: message.text.clone(),
                tags: message.tags.clone(),
                references,
                ner_spans,
                ref_count,
                is_progress_report: ref_count > 0,
            }
        })
        .collect();

    let system_skipped = if filter.include_system {
        0
    } else {
        messages.iter().filter(|m| m.is_system).count()
    };

    let mut tags = BTreeMap::new();
    for tag in annotations.iter().flat_map(|a| &a.tags) {
        *tags.entry(*tag).or_insert(0) += 1;
    }

    let summary = AnnotationSummary {
        messages: messages.len(),
        system_skipped,
        filtered_out: messages.len() - system_skipped - annotations.len(),
        labeled: annotations.iter().filter(|a| a.is_progress_report).count(),
        references: annotations.iter().map(|a| a.ref_count).sum(),
        invalid_references: annotations
            .iter()
            .flat_map(|a| &a.references)
            .filter(|r| !r.is_valid)
            .count(),
        tags,
        stats: engine.stats(),
    };

    (annotations, summary)
}

fn print_text(annotations: &[&MessageAnnotation], summary: &AnnotationSummary) {
    for a in annotations {
        let when = a
            .timestamp
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        let sender = a.sender.as_deref().unwrap_or("(system)");
        println!("#{:<5} {} {}: {}", a.index, when, sender, a.text.replace('\n', " / "));
        for r in &a.references {
            println!("         {}", describe(r));
        }
    }

    println!();
    println!("Messages:         {}", summary.messages);
    println!("System skipped:   {}", summary.system_skipped);
    println!("Filtered out:     {}", summary.filtered_out);
    println!("Labeled:          {}", summary.labeled);
    println!(
        "References:       {} ({} invalid)",
        summary.references, summary.invalid_references
    );
    println!(
        "Resolutions:      {} exact, {} fuzzy, {} failed",
        summary.stats.exact, summary.stats.fuzzy, summary.stats.failed
    );
    if !summary.tags.is_empty() {
        println!("Tags:");
        for (tag, count) in &summary.tags {
            println!("  {:<14}  {:>6} ({:.1}%)", tag, count, summary.tag_percentage(*tag));
        }
    }
}

fn print_tsv(annotations: &[&MessageAnnotation]) {
    println!("index\ttimestamp\tsender\ttags\tref_count\tis_progress_report\treferences\ttext");
    for a in annotations {
        let references: Vec<&str> = a.references.iter().map(|r| r.normalized_text.as_str()).collect();
        let tags: Vec<String> = a.tags.iter().map(ToString::to_string).collect();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            a.index,
            a.timestamp.map(|t| t.to_string()).unwrap_or_default(),
            tsv_cell(a.sender.as_deref().unwrap_or_default()),
            tags.join(","),
            a.ref_count,
            a.is_progress_report,
            references.join("; "),
            tsv_cell(&a.text)
        );
    }
}
