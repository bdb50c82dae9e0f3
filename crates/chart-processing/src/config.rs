//! Configuration types for the chart transformation.
//!
//! Defaults reproduce the fixed batch job: read `filtered_spotify.csv`,
//! keep ranks up to 20, write `data.csv`. Every field can be overridden
//! through [`TransformConfig::builder()`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default input file, relative to the working directory.
pub const DEFAULT_INPUT_PATH: &str = "filtered_spotify.csv";

/// Default output file, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "data.csv";

/// Highest rank (inclusive) that survives the filter.
pub const DEFAULT_MAX_RANK: f64 = 20.0;

/// Genre keywords in the order their passes are applied.
pub const DEFAULT_GENRE_KEYWORDS: [&str; 8] = [
    "pop",
    "trap",
    "reggaeton",
    "rock",
    "latin",
    "hip hop",
    "rap",
    "r&b",
];

/// Value assigned to genres that match no keyword.
pub const DEFAULT_FALLBACK_GENRE: &str = "other";

/// How keyword passes interact when a genre text contains several keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GenreMatchMode {
    /// Every pass tests the original text; the matching keyword that comes
    /// last in the list wins ("Korean Pop/Rock" -> "rock").
    #[default]
    LastMatchWins,
    /// Every pass tests the value left by the previous passes, so a cell
    /// already rewritten to "trap" is rewritten again to "rap".
    Cascading,
}

/// Configuration for a chart transformation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// CSV file to read.
    /// Default: "filtered_spotify.csv"
    pub input_path: PathBuf,

    /// CSV file to write (overwritten if present).
    /// Default: "data.csv"
    pub output_path: PathBuf,

    /// Numeric rank column.
    pub rank_column: String,

    /// Country column (part of the dedup key).
    pub country_column: String,

    /// Week column (part of the dedup key).
    pub week_column: String,

    /// Free-text genre column that gets normalized.
    pub genre_column: String,

    /// Rows with a rank above this value are dropped.
    /// Default: 20.0
    pub max_rank: f64,

    /// Ordered genre keywords, matched case-insensitively.
    pub genre_keywords: Vec<String>,

    /// Genre assigned when no keyword matches.
    /// Default: "other"
    pub fallback_genre: String,

    /// Resolution rule for texts matching several keywords.
    /// Default: LastMatchWins
    pub match_mode: GenreMatchMode,

    /// Print the deduplicated table (before the rank filter) to stdout.
    /// Default: true
    pub print_preview: bool,

    /// Write the filtered table to `output_path`.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            rank_column: "rank".to_string(),
            country_column: "country".to_string(),
            week_column: "week".to_string(),
            genre_column: "artist_genre".to_string(),
            max_rank: DEFAULT_MAX_RANK,
            genre_keywords: DEFAULT_GENRE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            fallback_genre: DEFAULT_FALLBACK_GENRE.to_string(),
            match_mode: GenreMatchMode::default(),
            print_preview: true,
            save_to_disk: true,
        }
    }
}

impl TransformConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = TransformConfig::builder()
    ///     .input_path("charts.csv")
    ///     .max_rank(10.0)
    ///     .build()?;
    /// ```
    pub fn builder() -> TransformConfigBuilder {
        TransformConfigBuilder::default()
    }

    /// Columns whose combined values identify a chart entry.
    pub fn dedup_key(&self) -> [&str; 3] {
        [
            self.rank_column.as_str(),
            self.country_column.as_str(),
            self.week_column.as_str(),
        ]
    }

    /// Columns the input must contain.
    pub fn required_columns(&self) -> [&str; 4] {
        [
            self.rank_column.as_str(),
            self.country_column.as_str(),
            self.week_column.as_str(),
            self.genre_column.as_str(),
        ]
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.max_rank.is_finite() {
            return Err(ConfigValidationError::InvalidMaxRank(self.max_rank));
        }

        if self.genre_keywords.is_empty() {
            return Err(ConfigValidationError::EmptyKeywords);
        }

        if let Some(pos) = self.genre_keywords.iter().position(|k| k.trim().is_empty()) {
            return Err(ConfigValidationError::BlankKeyword(pos));
        }

        if self.fallback_genre.trim().is_empty() {
            return Err(ConfigValidationError::BlankFallback);
        }

        for (field, value) in [
            ("rank_column", &self.rank_column),
            ("country_column", &self.country_column),
            ("week_column", &self.week_column),
            ("genre_column", &self.genre_column),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::BlankColumn(field.to_string()));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid max rank: {0} (must be a finite number)")]
    InvalidMaxRank(f64),

    #[error("Genre keyword list must not be empty")]
    EmptyKeywords,

    #[error("Genre keyword at position {0} is blank")]
    BlankKeyword(usize),

    #[error("Fallback genre must not be blank")]
    BlankFallback,

    #[error("Column name for '{0}' must not be blank")]
    BlankColumn(String),
}

/// Builder for [`TransformConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct TransformConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    rank_column: Option<String>,
    country_column: Option<String>,
    week_column: Option<String>,
    genre_column: Option<String>,
    max_rank: Option<f64>,
    genre_keywords: Option<Vec<String>>,
    fallback_genre: Option<String>,
    match_mode: Option<GenreMatchMode>,
    print_preview: Option<bool>,
    save_to_disk: Option<bool>,
}

impl TransformConfigBuilder {
    /// Set the CSV file to read.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the CSV file to write.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn rank_column(mut self, name: impl Into<String>) -> Self {
        self.rank_column = Some(name.into());
        self
    }

    pub fn country_column(mut self, name: impl Into<String>) -> Self {
        self.country_column = Some(name.into());
        self
    }

    pub fn week_column(mut self, name: impl Into<String>) -> Self {
        self.week_column = Some(name.into());
        self
    }

    pub fn genre_column(mut self, name: impl Into<String>) -> Self {
        self.genre_column = Some(name.into());
        self
    }

    /// Set the highest rank (inclusive) kept by the filter.
    pub fn max_rank(mut self, max_rank: f64) -> Self {
        self.max_rank = Some(max_rank);
        self
    }

    /// Replace the ordered keyword list.
    ///
    /// Keywords are lowercased so matching stays case-insensitive.
    pub fn genre_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genre_keywords = Some(
            keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        );
        self
    }

    pub fn fallback_genre(mut self, genre: impl Into<String>) -> Self {
        self.fallback_genre = Some(genre.into());
        self
    }

    pub fn match_mode(mut self, mode: GenreMatchMode) -> Self {
        self.match_mode = Some(mode);
        self
    }

    /// Enable or disable printing the deduplicated table.
    pub fn print_preview(mut self, print: bool) -> Self {
        self.print_preview = Some(print);
        self
    }

    /// Enable or disable writing the output file.
    ///
    /// When false, the filtered table is only returned in memory.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `TransformConfig` or an error if validation fails.
    pub fn build(self) -> Result<TransformConfig, ConfigValidationError> {
        let defaults = TransformConfig::default();
        let config = TransformConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            output_path: self.output_path.unwrap_or(defaults.output_path),
            rank_column: self.rank_column.unwrap_or(defaults.rank_column),
            country_column: self.country_column.unwrap_or(defaults.country_column),
            week_column: self.week_column.unwrap_or(defaults.week_column),
            genre_column: self.genre_column.unwrap_or(defaults.genre_column),
            max_rank: self.max_rank.unwrap_or(defaults.max_rank),
            genre_keywords: self.genre_keywords.unwrap_or(defaults.genre_keywords),
            fallback_genre: self.fallback_genre.unwrap_or(defaults.fallback_genre),
            match_mode: self.match_mode.unwrap_or_default(),
            print_preview: self.print_preview.unwrap_or(true),
            save_to_disk: self.save_to_disk.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
