//! Top words per document by pointwise mutual information.

use anyhow::{Context, Result};
use clap::Parser;
use rowflow::algorithms::pmi_graph;
use rowflow::io::jsonl::{parse_json_line, write_json_array};
use rowflow::{Graph, Inputs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rank each document's words by pointwise mutual information and keep the
/// top three.
#[derive(Parser)]
struct Args {
    /// Input corpus, one JSON object per line.
    input: PathBuf,
    /// Output path for the JSON array of rankings.
    output: PathBuf,
    /// Column holding the document id.
    #[arg(long, default_value = "doc_id")]
    doc_column: String,
    /// Column holding the document text.
    #[arg(long, default_value = "text")]
    text_column: String,
    /// Column to store the pmi score in.
    #[arg(long, default_value = "pmi")]
    result_column: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let graph = pmi_graph(
        Graph::from_file(&args.input, parse_json_line),
        &args.doc_column,
        &args.text_column,
        &args.result_column,
    );
    let rankings = graph
        .run(&Inputs::new())?
        .collect::<rowflow::Result<Vec<_>>>()
        .with_context(|| format!("rank {}", args.input.display()))?;
    write_json_array(&args.output, &rankings)
        .with_context(|| format!("write {}", args.output.display()))?;
    Ok(())
}
