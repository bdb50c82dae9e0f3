//! CLI entry point for the chart transformation.
//!
//! With no arguments this reads `filtered_spotify.csv`, writes `data.csv`
//! and prints the deduplicated table.

use anyhow::{Result, anyhow};
use chart_processing::{
    ChartPipeline, GenreMatchMode, TransformConfig, TransformOutput, write_chart_table,
};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{error, info};

/// CLI-compatible genre match mode
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMatchMode {
    /// The last keyword in list order that occurs in the text wins
    LastMatch,
    /// Each pass re-tests the value left by earlier passes
    Cascading,
}

impl From<CliMatchMode> for GenreMatchMode {
    fn from(cli: CliMatchMode) -> Self {
        match cli {
            CliMatchMode::LastMatch => GenreMatchMode::LastMatchWins,
            CliMatchMode::Cascading => GenreMatchMode::Cascading,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Deduplicate, genre-normalize and top-rank filter a chart CSV",
    long_about = "Reads a chart CSV, converts rank to numbers, drops repeated \
                  (rank, country, week) rows, maps artist_genre onto a fixed \
                  taxonomy and writes the top-ranked rows.\n\n\
                  EXAMPLES:\n  \
                  # Default job: filtered_spotify.csv -> data.csv\n  \
                  chart-processing\n\n  \
                  # Top 10 only, no table dump\n  \
                  chart-processing --max-rank 10 --no-preview\n\n  \
                  # Preview without writing\n  \
                  chart-processing --dry-run"
)]
struct Args {
    /// CSV file to read
    #[arg(short, long, default_value = "filtered_spotify.csv")]
    input: PathBuf,

    /// CSV file to write (overwritten if present)
    #[arg(short, long, default_value = "data.csv")]
    output: PathBuf,

    /// Highest rank (inclusive) to keep
    #[arg(long, default_value = "20")]
    max_rank: f64,

    /// How to resolve genre texts that match several keywords
    #[arg(long, value_enum, default_value = "last-match")]
    match_mode: CliMatchMode,

    /// Do not print the deduplicated table
    #[arg(long)]
    no_preview: bool,

    /// Run the transform but do not write the output file
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON instead of the table
    ///
    /// Disables logging so stdout carries only JSON.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so the printed table stays clean on stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // .env may set RUST_LOG
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = TransformConfig::builder()
        .input_path(&args.input)
        .output_path(&args.output)
        .max_rank(args.max_rank)
        .match_mode(args.match_mode.into())
        .print_preview(!args.no_preview && !args.json)
        .save_to_disk(!args.dry_run)
        .build()?;

    let pipeline = ChartPipeline::new(config);
    let output = match pipeline.run() {
        Ok(output) => output,
        Err(e) => {
            error!("Run failed: {}", e);
            return Err(anyhow!(e));
        }
    };

    print_output(&output, pipeline.config(), &args)
}

/// Write results to stdout according to the CLI flags.
fn print_output(output: &TransformOutput, config: &TransformConfig, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&output.summary)?);
        return Ok(());
    }

    if config.print_preview {
        let mut table = output.deduplicated.clone();
        write_chart_table(&mut table, std::io::stdout().lock())?;
    }

    let summary = &output.summary;
    info!(
        "Kept {} of {} rows ({:.1}%) in {}ms",
        summary.rows_written,
        summary.rows_loaded,
        summary.retention_percentage(),
        summary.duration_ms
    );
    for (genre, count) in &summary.genre_counts {
        info!("  {:<10} {}", genre, count);
    }
    if args.dry_run {
        info!("Dry run: {} was not written", args.output.display());
    }

    Ok(())
}
