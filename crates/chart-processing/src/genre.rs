//! Genre taxonomy and normalization of the free-text genre column.
//!
//! The taxonomy is an ordered keyword list plus a fallback label. Each
//! keyword is applied as a pass over the whole column: cells whose text
//! contains the keyword (case-insensitively) are rewritten to it. Because
//! every pass runs, a text that contains several keywords ends up with
//! whichever matching keyword comes last in the list. Cells left holding
//! anything outside the taxonomy become the fallback label.
//!
//! Passes are independent across rows, so they are evaluated row by row
//! here; the result is identical to running them column by column.

use crate::config::{ConfigValidationError, GenreMatchMode, TransformConfig};
use crate::error::{ChartError, Result, ResultExt};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Ordered genre keywords with a fallback label.
#[derive(Debug, Clone)]
pub struct GenreTaxonomy {
    keywords: Vec<String>,
    fallback: String,
    mode: GenreMatchMode,
}

impl GenreTaxonomy {
    pub fn new<I, S>(keywords: I, fallback: impl Into<String>, mode: GenreMatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
            fallback: fallback.into(),
            mode,
        }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(
            config.genre_keywords.iter().cloned(),
            config.fallback_genre.clone(),
            config.match_mode,
        )
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Check the same keyword and fallback rules as `TransformConfig::validate`.
    ///
    /// A blank keyword would match every cell.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.keywords.is_empty() {
            return Err(ConfigValidationError::EmptyKeywords);
        }
        if let Some(pos) = self.keywords.iter().position(|k| k.trim().is_empty()) {
            return Err(ConfigValidationError::BlankKeyword(pos));
        }
        if self.fallback.trim().is_empty() {
            return Err(ConfigValidationError::BlankFallback);
        }
        Ok(())
    }

    /// True if `value` is one of the labels a normalized cell can hold.
    pub fn contains_label(&self, value: &str) -> bool {
        value == self.fallback || self.keywords.iter().any(|k| k == value)
    }

    /// Map one genre cell to its taxonomy label.
    pub fn classify(&self, text: Option<&str>) -> &str {
        let Some(text) = text else {
            return &self.fallback;
        };

        let resolved: Option<&str> = match self.mode {
            GenreMatchMode::LastMatchWins => {
                let lowered = text.to_lowercase();
                self.keywords
                    .iter()
                    .rev()
                    .find(|k| lowered.contains(k.as_str()))
                    .map(String::as_str)
            }
            GenreMatchMode::Cascading => {
                let mut current = text.to_lowercase();
                let mut hit: Option<&str> = None;
                for keyword in &self.keywords {
                    if current.contains(keyword.as_str()) {
                        current = keyword.clone();
                        hit = Some(keyword.as_str());
                    }
                }
                hit
            }
        };

        resolved.unwrap_or(&self.fallback)
    }

    /// Rewrite `column` of `df` so every cell holds a taxonomy label.
    pub fn normalize_column(&self, df: &mut DataFrame, column: &str) -> Result<()> {
        let source = df
            .column(column)
            .map_err(|_| ChartError::ColumnNotFound(column.to_string()))?
            .cast(&DataType::String)?;
        let str_series = source.str()?;

        let normalized: Vec<&str> = str_series
            .into_iter()
            .map(|opt_val| self.classify(opt_val))
            .collect();

        let series = Series::new(column.into(), normalized);
        df.replace(column, series)
            .context(format!("Replacing column '{}'", column))?;

        debug!(
            "Normalized '{}' into {} labels ({:?})",
            column,
            self.keywords.len() + 1,
            self.mode
        );
        Ok(())
    }

    /// Count rows per label in an already normalized column.
    pub fn label_counts(&self, df: &DataFrame, column: &str) -> Result<BTreeMap<String, usize>> {
        let source = df
            .column(column)
            .map_err(|_| ChartError::ColumnNotFound(column.to_string()))?;
        let mut counts = BTreeMap::new();
        for value in source.str()?.into_iter().flatten() {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

impl Default for GenreTaxonomy {
    fn default() -> Self {
        Self::from_config(&TransformConfig::default())
    }
}
