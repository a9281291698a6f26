use anyhow::Result;
use clap::Parser;
use jsonshard::ingest::{collect_json_inputs, inject_metadata, load_json_objects};
use jsonshard_core::{AdvisorThresholds, ClusterParams, ShapeDiscovery};
use jsonshard_storage::{BatchWriter, RelationalOptions};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Discover shapes in heterogeneous JSON and route them to storage
#[derive(Parser, Debug)]
#[command(name = "jsonshard")]
#[command(about = "Shape discovery and storage routing for JSON batches", long_about = None)]
struct Args {
    /// Input file or directory scanned for .json/.jsonl/.ndjson files
    input: PathBuf,

    /// SQLite database receiving SQL-routed clusters
    #[arg(long, default_value = "store.db")]
    db_path: PathBuf,

    /// Directory receiving per-entity document logs
    #[arg(long, default_value = "document_store")]
    document_dir: PathBuf,

    /// Clustering neighbourhood radius
    #[arg(long, default_value_t = 0.35)]
    eps: f64,

    /// Minimum neighbourhood size for a core point
    #[arg(long, default_value_t = 2)]
    min_pts: usize,

    /// Metadata injected into every record before discovery
    /// (JSON object, or a plain string treated as a comment)
    #[arg(long)]
    meta: Option<String>,

    /// Add columns to existing tables for newly observed fields
    #[arg(long)]
    evolve_schema: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting jsonshard v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {:?}", args.input);
    info!("Database: {:?}", args.db_path);
    info!("Document store: {:?}", args.document_dir);

    let inputs = collect_json_inputs(&args.input)?;
    if inputs.is_empty() {
        warn!("No JSON inputs found under {:?}", args.input);
        return Ok(());
    }

    let mut records: Vec<Value> = Vec::new();
    for path in &inputs {
        let objects = load_json_objects(path)?;
        info!("Loaded {} object(s) from {:?}", objects.len(), path);
        records.extend(objects);
    }
    if records.is_empty() {
        warn!("No JSON objects found in {} file(s)", inputs.len());
        return Ok(());
    }

    if let Some(raw) = &args.meta {
        let meta: Value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::json!({ "metacomments": raw }));
        inject_metadata(&mut records, &meta);
    }

    let engine = ShapeDiscovery::new(
        ClusterParams {
            eps: args.eps,
            min_pts: args.min_pts,
        },
        AdvisorThresholds::default(),
    );
    let report = engine.discover(&records);
    info!(
        "Discovered {} group(s) across {} record(s)",
        report.groups.len(),
        records.len()
    );

    let writer = BatchWriter::new(&args.db_path, &args.document_dir).with_options(
        RelationalOptions {
            evolve_schema: args.evolve_schema,
        },
    );
    let summary = writer.write(&records, &report)?;

    info!(
        "Done: {} SQL row(s), {} document(s), {} record(s) failed",
        summary.sql_rows, summary.documents, summary.failed
    );
    Ok(())
}
