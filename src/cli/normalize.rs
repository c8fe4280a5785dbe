use std::path::PathBuf;

use clap::Args;

use crate::cli::extract::describe;
use crate::cli::{read_input, EngineArgs, OutputFormat};
use crate::parsing::external::{parse_response, try_parse_response};

#[derive(Args)]
pub struct NormalizeArgs {
    /// Extractor output: a JSON array of candidates, optionally fenced or
    /// surrounded by prose. Use '-' for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Fail on unparseable input instead of treating it as empty
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn run(args: NormalizeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let content = read_input(&args.input)?;

    let candidates = if args.strict {
        try_parse_response(&content)?
    } else {
        parse_response(&content)
    };

    if verbose {
        eprintln!("Read {} candidates", candidates.len());
    }

    let engine = args.engine.build_engine(verbose)?;
    let references = engine.normalize(&candidates);

    if verbose && references.len() < candidates.len() {
        eprintln!(
            "Dropped {} candidates whose book could not be resolved",
            candidates.len() - references.len()
        );
    }

    match format {
        OutputFormat::Text => {
            if references.is_empty() {
                eprintln!("No references resolved.");
            }
            for r in &references {
                let label = r.source_label.as_deref().unwrap_or("external");
                match r.candidate_confidence {
                    Some(score) => println!("{}  [{} {:.2}]", describe(r), label, score),
                    None => println!("{}  [{}]", describe(r), label),
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&references)?);
        }
        OutputFormat::Tsv => {
            println!("book_id\tstart_chapter\tend_chapter\tnormalized\tvalid\tmethod\tconfidence\tcandidate_confidence\tsource");
            for r in &references {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{:.3}\t{}\t{}",
                    r.book_id,
                    r.start_chapter,
                    r.end_chapter,
                    r.normalized_text,
                    r.is_valid,
                    r.resolution_method,
                    r.confidence,
                    r.candidate_confidence
                        .map(|c| format!("{c:.3}"))
                        .unwrap_or_default(),
                    r.source_label.as_deref().unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
