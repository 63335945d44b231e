//! oxide-sqlgraph CLI
//!
//! Analyzes a SELECT statement and prints its table graph.

mod report;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_sqlgraph::{analyze, layout, LayoutOptions};

use crate::report::Report;

/// Structural analyzer for SQL SELECT statements.
#[derive(Parser)]
#[command(name = "oxide-sqlgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File containing the query (stdin if neither this nor --query is given).
    file: Option<PathBuf>,

    /// Query text, takes precedence over FILE.
    #[arg(short, long)]
    query: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Include table positions from the circular layout.
    #[arg(short, long)]
    layout: bool,

    /// Pretty-print JSON output.
    #[arg(short, long)]
    pretty: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Horizontal center of the layout circle.
    #[arg(long, env = "SQLGRAPH_CENTER_X", default_value_t = 400.0)]
    center_x: f64,

    /// Vertical center of the layout circle.
    #[arg(long, env = "SQLGRAPH_CENTER_Y", default_value_t = 300.0)]
    center_y: f64,

    /// Smallest layout radius.
    #[arg(long, env = "SQLGRAPH_MIN_RADIUS", default_value_t = 150.0)]
    min_radius: f64,

    /// Radius added per table.
    #[arg(long, env = "SQLGRAPH_RADIUS_STEP", default_value_t = 40.0)]
    radius_step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `{tables, edges, diagnostics}` as JSON.
    Json,
    /// Human-readable listing.
    Summary,
}

impl Cli {
    const fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            center_x: self.center_x,
            center_y: self.center_y,
            min_radius: self.min_radius,
            radius_per_table: self.radius_step,
        }
    }

    fn read_query(&self) -> anyhow::Result<String> {
        if let Some(query) = &self.query {
            return Ok(query.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()));
        }
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read query from stdin")?;
        Ok(input)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays parseable
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let sql = cli.read_query()?;
    debug!(bytes = sql.len(), "analyzing query");

    let result = analyze(&sql);
    let positions = cli
        .layout
        .then(|| layout(&result.tables, &cli.layout_options()));
    let report = Report::new(&result, positions);

    let output = match cli.format {
        Format::Json => report.to_json(cli.pretty)?,
        Format::Summary => report.to_summary(),
    };
    println!("{output}");

    Ok(())
}
