//! The chart transformation pipeline and its builder.

use crate::cleaner::ChartCleaner;
use crate::config::TransformConfig;
use crate::error::{ChartError, Result};
use crate::genre::GenreTaxonomy;
use crate::io::{ensure_columns, load_chart_csv, write_chart_csv};
use crate::pipeline::progress::{
    ClosureStageReporter, StageReporter, StageUpdate, TransformStage,
};
use crate::types::{TransformOutput, TransformSummary};
use chrono::Local;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Load, clean, normalize, filter and write a chart table.
///
/// # Example
///
/// ```rust,ignore
/// use chart_processing::{ChartPipeline, TransformConfig};
///
/// // Fixed batch job: filtered_spotify.csv -> data.csv
/// let output = ChartPipeline::new(TransformConfig::default()).run()?;
///
/// // In-memory only, with stage logging
/// let output = ChartPipeline::builder()
///     .config(TransformConfig::builder().save_to_disk(false).build()?)
///     .on_stage(|update| println!("{}", update.message))
///     .build()?
///     .process(df)?;
/// ```
pub struct ChartPipeline {
    config: TransformConfig,
    taxonomy: GenreTaxonomy,
    cleaner: ChartCleaner,
    stage_reporter: Option<Arc<dyn StageReporter>>,
}

static_assertions::assert_impl_all!(ChartPipeline: Send);

impl std::fmt::Debug for ChartPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartPipeline")
            .field("config", &self.config)
            .field("taxonomy", &self.taxonomy)
            .field("cleaner", &self.cleaner)
            .field("stage_reporter", &self.stage_reporter.is_some())
            .finish()
    }
}

impl ChartPipeline {
    /// Pipeline with the taxonomy derived from `config`.
    pub fn new(config: TransformConfig) -> Self {
        let taxonomy = GenreTaxonomy::from_config(&config);
        Self {
            config,
            taxonomy,
            cleaner: ChartCleaner,
            stage_reporter: None,
        }
    }

    pub fn builder() -> ChartPipelineBuilder {
        ChartPipelineBuilder::default()
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn taxonomy(&self) -> &GenreTaxonomy {
        &self.taxonomy
    }

    fn report(&self, update: StageUpdate) {
        if let Some(reporter) = &self.stage_reporter {
            reporter.report(update);
        }
    }

    fn enter(&self, stage: TransformStage, message: impl Into<String>) {
        let message = message.into();
        if let Some(step) = stage.step() {
            info!("[{}/{}] {}", step, TransformStage::STEPS, message);
        }
        self.report(StageUpdate::new(stage, message));
    }

    /// Run the whole job: read the input file, transform, write the output.
    ///
    /// The output file is skipped when `save_to_disk` is off.
    pub fn run(&self) -> Result<TransformOutput> {
        match self.run_internal() {
            Ok(output) => {
                self.report(StageUpdate::complete(format!(
                    "{} rows written",
                    output.summary.rows_written
                )));
                Ok(output)
            }
            Err(e) => {
                error!("Chart transformation failed: {}", e);
                self.report(StageUpdate::failed(e.to_string()));
                Err(e)
            }
        }
    }

    fn run_internal(&self) -> Result<TransformOutput> {
        let start_time = Instant::now();
        let input = self.config.input_path.display().to_string();

        self.enter(TransformStage::Loading, format!("Loading {}", input));
        let df = load_chart_csv(&self.config.input_path)?;

        let mut output = self.process(df)?;
        output.summary.input_file = Some(input);

        if self.config.save_to_disk {
            let path = self.config.output_path.display().to_string();
            self.enter(TransformStage::Writing, format!("Writing {}", path));
            write_chart_csv(&mut output.top_entries, &self.config.output_path)?;
            output.summary.output_file = Some(path);
        } else {
            info!("Output not saved (save_to_disk disabled)");
        }

        output.summary.duration_ms = start_time.elapsed().as_millis() as u64;
        Ok(output)
    }

    /// Transform an in-memory table: coerce ranks, deduplicate, normalize
    /// genres, filter by rank. No file is read or written.
    pub fn process(&self, df: DataFrame) -> Result<TransformOutput> {
        let start_time = Instant::now();
        let config = &self.config;
        let mut summary = TransformSummary::new();
        summary.rows_loaded = df.height();

        ensure_columns(&df, &config.required_columns())?;
        let mut df = df;

        self.enter(
            TransformStage::RankCoercion,
            format!("Coercing '{}' to numeric", config.rank_column),
        );
        summary.unparsable_ranks = self.cleaner.coerce_rank_column(&mut df, &config.rank_column)?;

        self.enter(
            TransformStage::Deduplication,
            format!("Removing duplicates on {:?}", config.dedup_key()),
        );
        let (mut deduplicated, removed) = self.cleaner.deduplicate(&df, &config.dedup_key())?;
        summary.duplicates_removed = removed;
        summary.rows_deduplicated = deduplicated.height();

        self.enter(
            TransformStage::GenreNormalization,
            format!(
                "Normalizing '{}' over {} keywords",
                config.genre_column,
                self.taxonomy.keywords().len()
            ),
        );
        self.taxonomy
            .normalize_column(&mut deduplicated, &config.genre_column)?;
        summary.genre_counts = self
            .taxonomy
            .label_counts(&deduplicated, &config.genre_column)?;

        self.enter(
            TransformStage::RankFilter,
            format!("Keeping rows with {} <= {}", config.rank_column, config.max_rank),
        );
        let top_entries =
            self.cleaner
                .filter_top_ranked(&deduplicated, &config.rank_column, config.max_rank)?;
        summary.rows_written = top_entries.height();
        summary.rows_filtered_out = summary.rows_deduplicated - summary.rows_written;

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        summary.generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        info!(
            "Rows: {} loaded, {} duplicates, {} below cutoff, {} kept",
            summary.rows_loaded,
            summary.duplicates_removed,
            summary.rows_filtered_out,
            summary.rows_written
        );

        Ok(TransformOutput {
            deduplicated,
            top_entries,
            summary,
        })
    }
}

impl Default for ChartPipeline {
    fn default() -> Self {
        Self::new(TransformConfig::default())
    }
}

/// Builder for [`ChartPipeline`].
#[derive(Default)]
pub struct ChartPipelineBuilder {
    config: Option<TransformConfig>,
    taxonomy: Option<GenreTaxonomy>,
    stage_reporter: Option<Arc<dyn StageReporter>>,
}

impl ChartPipelineBuilder {
    pub fn config(mut self, config: TransformConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a taxonomy other than the one described by the config.
    pub fn taxonomy(mut self, taxonomy: GenreTaxonomy) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    pub fn stage_reporter(mut self, reporter: Arc<dyn StageReporter>) -> Self {
        self.stage_reporter = Some(reporter);
        self
    }

    /// Receive stage updates through a closure.
    pub fn on_stage<F>(mut self, callback: F) -> Self
    where
        F: Fn(StageUpdate) + Send + Sync + 'static,
    {
        self.stage_reporter = Some(Arc::new(ClosureStageReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<ChartPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate().map_err(ChartError::from)?;

        let taxonomy = match self.taxonomy {
            Some(t) => {
                t.validate().map_err(ChartError::from)?;
                t
            }
            None => GenreTaxonomy::from_config(&config),
        };

        Ok(ChartPipeline {
            config,
            taxonomy,
            cleaner: ChartCleaner,
            stage_reporter: self.stage_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenreMatchMode;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn chart() -> DataFrame {
        df![
            "rank" => ["5", "3", "3", "abc", "21", "20"],
            "country" => ["US", "MX", "MX", "US", "US", "AR"],
            "week" => ["2023-01-01", "W1", "W1", "2023-01-01", "2023-01-01", "W1"],
            "artist_genre" => [
                "Korean Pop/Rock",
                "reggaeton",
                "reggaeton",
                "pop",
                "rock",
                "cumbia",
            ],
            "track_name" => ["a", "b", "c", "d", "e", "f"],
        ]
        .unwrap()
    }

    fn in_memory() -> ChartPipeline {
        ChartPipeline::builder()
            .config(TransformConfig::builder().save_to_disk(false).build().unwrap())
            .build()
            .unwrap()
    }

    fn strings(df: &DataFrame, column: &str) -> Vec<String> {
        df.column(column)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_process_end_to_end() {
        let output = in_memory().process(chart()).unwrap();

        // duplicate (3, MX, W1) dropped; bad and 21 ranks filtered out
        assert_eq!(output.summary.rows_loaded, 6);
        assert_eq!(output.summary.unparsable_ranks, 1);
        assert_eq!(output.summary.duplicates_removed, 1);
        assert_eq!(output.summary.rows_deduplicated, 5);
        assert_eq!(output.summary.rows_written, 3);
        assert_eq!(output.summary.rows_filtered_out, 2);

        assert_eq!(strings(&output.top_entries, "track_name"), vec!["a", "b", "f"]);
        assert_eq!(
            strings(&output.top_entries, "artist_genre"),
            vec!["rock", "reggaeton", "other"]
        );
    }

    #[test]
    fn test_deduplicated_table_keeps_out_of_range_rows() {
        let output = in_memory().process(chart()).unwrap();

        assert_eq!(output.deduplicated.height(), 5);
        assert_eq!(output.deduplicated.column("rank").unwrap().null_count(), 1);
        assert_eq!(output.summary.genre_counts.get("pop"), Some(&1));
        assert_eq!(output.summary.genre_counts.get("rock"), Some(&2));
    }

    #[test]
    fn test_missing_required_column() {
        let df = chart().drop("week").unwrap();
        let err = in_memory().process(df).unwrap_err();
        assert!(matches!(err, ChartError::ColumnNotFound(ref c) if c == "week"));
    }

    #[test]
    fn test_custom_taxonomy_overrides_config() {
        let pipeline = ChartPipeline::builder()
            .config(TransformConfig::builder().save_to_disk(false).build().unwrap())
            .taxonomy(GenreTaxonomy::new(["pop", "rock"], "misc", GenreMatchMode::Cascading))
            .build()
            .unwrap();

        let output = pipeline.process(chart()).unwrap();
        assert_eq!(
            strings(&output.top_entries, "artist_genre"),
            vec!["pop", "misc", "misc"]
        );
    }

    #[test]
    fn test_empty_taxonomy_rejected() {
        let result = ChartPipeline::builder()
            .taxonomy(GenreTaxonomy::new(Vec::<String>::new(), "other", GenreMatchMode::default()))
            .build();
        assert!(matches!(result, Err(ChartError::InvalidConfig(_))));
    }

    #[test]
    fn test_blank_taxonomy_keyword_rejected() {
        let result = ChartPipeline::builder()
            .taxonomy(GenreTaxonomy::new(["pop", ""], "other", GenreMatchMode::default()))
            .build();
        assert!(matches!(result, Err(ChartError::InvalidConfig(ref m)) if m.contains("1")));
    }

    #[test]
    fn test_stage_updates_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("filtered_spotify.csv");
        std::fs::write(
            &input,
            "rank,country,week,artist_genre\n1,US,W1,pop\n2,US,W1,rap\n",
        )
        .unwrap();

        let pipeline = ChartPipeline::builder()
            .config(
                TransformConfig::builder()
                    .input_path(&input)
                    .output_path(dir.path().join("data.csv"))
                    .build()
                    .unwrap(),
            )
            .on_stage(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap();

        pipeline.run().unwrap();

        let stages = seen.lock().unwrap().clone();
        assert_eq!(
            stages,
            vec![
                TransformStage::Loading,
                TransformStage::RankCoercion,
                TransformStage::Deduplication,
                TransformStage::GenreNormalization,
                TransformStage::RankFilter,
                TransformStage::Writing,
                TransformStage::Complete,
            ]
        );
    }

    #[test]
    fn test_run_reports_failure_for_missing_input() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let dir = tempfile::tempdir().unwrap();

        let pipeline = ChartPipeline::builder()
            .config(
                TransformConfig::builder()
                    .input_path(dir.path().join("absent.csv"))
                    .build()
                    .unwrap(),
            )
            .on_stage(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap();

        let err = pipeline.run().unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert_eq!(
            seen.lock().unwrap().last().copied(),
            Some(TransformStage::Failed)
        );
    }
}
