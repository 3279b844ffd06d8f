//! TF-IDF table for a line-delimited JSON corpus.

use anyhow::{Context, Result};
use clap::Parser;
use rowflow::algorithms::inverted_index_graph;
use rowflow::io::jsonl::{parse_json_line, write_json_array};
use rowflow::{Graph, Inputs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Compute tf-idf for every word/document pair of a JSONL corpus, keeping
/// the three best documents per word.
#[derive(Parser)]
struct Args {
    /// Input corpus, one JSON object per line.
    input: PathBuf,
    /// Output path for the JSON array of scores.
    output: PathBuf,
    /// Column holding the document id.
    #[arg(long, default_value = "doc_id")]
    doc_column: String,
    /// Column holding the document text.
    #[arg(long, default_value = "text")]
    text_column: String,
    /// Column to store the tf-idf score in.
    #[arg(long, default_value = "tf_idf")]
    result_column: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let graph = inverted_index_graph(
        Graph::from_file(&args.input, parse_json_line),
        &args.doc_column,
        &args.text_column,
        &args.result_column,
    );
    let scores = graph
        .run(&Inputs::new())?
        .collect::<rowflow::Result<Vec<_>>>()
        .with_context(|| format!("index {}", args.input.display()))?;
    write_json_array(&args.output, &scores)
        .with_context(|| format!("write {}", args.output.display()))?;
    Ok(())
}
