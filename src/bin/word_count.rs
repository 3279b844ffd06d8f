//! Count words in a line-delimited JSON corpus.

use anyhow::{Context, Result};
use clap::Parser;
use rowflow::algorithms::word_count_graph;
use rowflow::io::jsonl::{parse_json_line, write_json_array};
use rowflow::{Graph, Inputs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Count words in the text column of a JSONL corpus and write the counts as
/// a JSON array.
#[derive(Parser)]
struct Args {
    /// Input corpus, one JSON object per line.
    input: PathBuf,
    /// Output path for the JSON array of counts.
    output: PathBuf,
    /// Column holding the document text.
    #[arg(long, default_value = "text")]
    text_column: String,
    /// Column to store each word's count in.
    #[arg(long, default_value = "count")]
    count_column: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let graph = word_count_graph(
        Graph::from_file(&args.input, parse_json_line),
        &args.text_column,
        &args.count_column,
    );
    let counts = graph
        .run(&Inputs::new())?
        .collect::<rowflow::Result<Vec<_>>>()
        .with_context(|| format!("count words in {}", args.input.display()))?;
    write_json_array(&args.output, &counts)
        .with_context(|| format!("write {}", args.output.display()))?;
    Ok(())
}
