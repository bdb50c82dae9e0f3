//! Music Chart Cleaning Library
//!
//! Batch transformation of chart-entry CSV exports built on Polars.
//!
//! # Overview
//!
//! One run performs, in order:
//!
//! - **Loading**: read the input CSV, all columns as text
//! - **Rank Coercion**: `rank` to numeric, unparsable values to null
//! - **Deduplication**: first row per (rank, country, week) wins
//! - **Genre Normalization**: free-text `artist_genre` onto a fixed taxonomy
//!   (`pop, trap, reggaeton, rock, latin, hip hop, rap, r&b`, else `other`)
//! - **Rank Filter**: keep rows with `rank <= 20`
//! - **Writing**: comma-separated CSV with a header row
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use chart_processing::{ChartPipeline, TransformConfig};
//!
//! // filtered_spotify.csv -> data.csv in the working directory
//! let output = ChartPipeline::new(TransformConfig::default()).run()?;
//! println!("{}", output.deduplicated);
//!
//! // Custom paths and cutoff
//! let config = TransformConfig::builder()
//!     .input_path("charts/2023.csv")
//!     .output_path("out/top10.csv")
//!     .max_rank(10.0)
//!     .build()?;
//! let output = ChartPipeline::new(config).run()?;
//! println!("kept {} rows", output.summary.rows_written);
//! ```
//!
//! # Genre matching
//!
//! Each keyword is a pass over the column. A text containing several
//! keywords resolves to the one that comes last in the list, so
//! `"Korean Pop/Rock"` becomes `rock`. See [`GenreMatchMode`] for the
//! cascading alternative.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod genre;
pub mod io;
pub mod pipeline;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::ChartCleaner;
pub use config::{ConfigValidationError, GenreMatchMode, TransformConfig, TransformConfigBuilder};
pub use error::{ChartError, Result as ChartResult, ResultExt};
pub use genre::GenreTaxonomy;
pub use io::{ensure_columns, load_chart_csv, write_chart_csv, write_chart_table};
pub use pipeline::{
    ChartPipeline, ChartPipelineBuilder, ClosureStageReporter, StageReporter, StageUpdate,
    TransformStage,
};
pub use types::{TransformOutput, TransformSummary};
pub use utils::parse_rank;
