//! Average traffic speed by weekday and hour.

use anyhow::{Context, Result};
use clap::Parser;
use rowflow::algorithms::{mean_speed_graph, SpeedColumns};
use rowflow::io::jsonl::{parse_json_line, write_json_array};
use rowflow::{Graph, Inputs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Measure average speed in km/h per weekday and hour from edge traversal
/// logs and edge geometry.
#[derive(Parser)]
struct Args {
    /// Traversal log, one JSON object per line with enter/leave timestamps.
    travel_times: PathBuf,
    /// Edge geometry, one JSON object per line with start/end coordinates.
    edge_lengths: PathBuf,
    /// Output path for the JSON array of speeds.
    output: PathBuf,
    /// Column holding the traversal start timestamp.
    #[arg(long, default_value = "enter_time")]
    enter_time_column: String,
    /// Column holding the traversal end timestamp.
    #[arg(long, default_value = "leave_time")]
    leave_time_column: String,
    /// Column identifying the road graph edge.
    #[arg(long, default_value = "edge_id")]
    edge_id_column: String,
    /// Column holding the edge start coordinate.
    #[arg(long, default_value = "start")]
    start_column: String,
    /// Column holding the edge end coordinate.
    #[arg(long, default_value = "end")]
    end_column: String,
    /// Column to store the weekday abbreviation in.
    #[arg(long, default_value = "weekday")]
    weekday_column: String,
    /// Column to store the hour of day in.
    #[arg(long, default_value = "hour")]
    hour_column: String,
    /// Column to store the average speed in.
    #[arg(long, default_value = "speed")]
    speed_column: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let columns = SpeedColumns {
        enter_time: args.enter_time_column,
        leave_time: args.leave_time_column,
        edge_id: args.edge_id_column,
        start: args.start_column,
        end: args.end_column,
        weekday: args.weekday_column,
        hour: args.hour_column,
        speed: args.speed_column,
    };
    let graph = mean_speed_graph(
        Graph::from_file(&args.travel_times, parse_json_line),
        Graph::from_file(&args.edge_lengths, parse_json_line),
        &columns,
    );
    let speeds = graph
        .run(&Inputs::new())?
        .collect::<rowflow::Result<Vec<_>>>()
        .with_context(|| format!("average speeds from {}", args.travel_times.display()))?;
    write_json_array(&args.output, &speeds)
        .with_context(|| format!("write {}", args.output.display()))?;
    Ok(())
}
