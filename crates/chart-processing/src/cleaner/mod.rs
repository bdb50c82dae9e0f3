//! Row-level cleaning for chart tables.
//!
//! This module provides:
//! - Rank coercion (text to numeric, bad values to null)
//! - Duplicate removal on the (rank, country, week) key
//! - The top-rank filter

mod converters;

pub use converters::CoercedRank;

use crate::error::{ChartError, Result, ResultExt};
use polars::prelude::*;
use tracing::{debug, warn};

/// Stateless cleaner for chart tables.
#[derive(Debug)]
pub struct ChartCleaner;

impl ChartCleaner {
    /// Replace the rank column with its numeric coercion.
    ///
    /// Returns the number of cells that held unparsable text.
    pub fn coerce_rank_column(&self, df: &mut DataFrame, rank_column: &str) -> Result<usize> {
        let column = df
            .column(rank_column)
            .map_err(|_| ChartError::ColumnNotFound(rank_column.to_string()))?;
        let coerced = converters::coerce_rank(column.as_materialized_series())?;

        df.replace(rank_column, coerced.series)
            .context(format!("Replacing column '{}'", rank_column))?;

        if coerced.unparsable > 0 {
            warn!(
                "{} value(s) in '{}' are not numeric and were set to null",
                coerced.unparsable, rank_column
            );
        } else {
            debug!("All values in '{}' parsed as numbers", rank_column);
        }

        Ok(coerced.unparsable)
    }

    /// Drop rows repeating an earlier row's key, keeping the first occurrence.
    ///
    /// Survivors keep their original relative order. Nulls in key columns
    /// compare equal to each other.
    pub fn deduplicate(&self, df: &DataFrame, key: &[&str]) -> Result<(DataFrame, usize)> {
        for name in key {
            if df.column(name).is_err() {
                return Err(ChartError::ColumnNotFound(name.to_string()));
            }
        }

        let before = df.height();
        let subset: Vec<String> = key.iter().map(|s| s.to_string()).collect();
        let deduped = df.unique_stable(Some(subset.as_slice()), UniqueKeepStrategy::First, None)?;
        let removed = before - deduped.height();

        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            debug!("Removed {} duplicate rows ({:.1}%)", removed, pct);
        } else {
            debug!("No duplicate rows found");
        }

        Ok((deduped, removed))
    }

    /// Keep rows whose rank is at most `max_rank`. Null ranks are dropped.
    pub fn filter_top_ranked(
        &self,
        df: &DataFrame,
        rank_column: &str,
        max_rank: f64,
    ) -> Result<DataFrame> {
        let rank = df
            .column(rank_column)
            .map_err(|_| ChartError::ColumnNotFound(rank_column.to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)?;

        // A null comparison yields null in the mask, which filter treats as false.
        let mask = rank.lt_eq(max_rank)?;
        let filtered = df.filter(&mask)?;

        debug!(
            "Kept {} of {} rows with {} <= {}",
            filtered.height(),
            df.height(),
            rank_column,
            max_rank
        );

        Ok(filtered)
    }
}
