use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a transformation run did, for logs and `--json` output.
///
/// # Example
///
/// ```rust,ignore
/// let output = ChartPipeline::new(config).run()?;
/// println!(
///     "{} of {} rows written in {}ms",
///     output.summary.rows_written, output.summary.rows_loaded, output.summary.duration_ms
/// );
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformSummary {
    /// Local timestamp at which the run finished.
    pub generated_at: String,

    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Input file, when the table was loaded from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,

    /// Output file, when the filtered table was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,

    /// Rows in the input table.
    pub rows_loaded: usize,
    /// Rank cells holding text that did not parse as a number.
    pub unparsable_ranks: usize,
    /// Rows dropped because their key repeated an earlier row.
    pub duplicates_removed: usize,
    /// Rows left after deduplication.
    pub rows_deduplicated: usize,
    /// Rows dropped by the rank filter (too low or missing).
    pub rows_filtered_out: usize,
    /// Rows in the final table.
    pub rows_written: usize,

    /// Label counts in the deduplicated table.
    pub genre_counts: BTreeMap<String, usize>,
}

impl TransformSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of loaded rows that reached the output, in percent.
    pub fn retention_percentage(&self) -> f64 {
        if self.rows_loaded == 0 {
            0.0
        } else {
            (self.rows_written as f64 / self.rows_loaded as f64) * 100.0
        }
    }
}

/// Tables produced by a run.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Deduplicated, genre-normalized table before the rank filter.
    pub deduplicated: DataFrame,
    /// Final table: rows with rank at most the configured maximum.
    pub top_entries: DataFrame,
    pub summary: TransformSummary,
}
