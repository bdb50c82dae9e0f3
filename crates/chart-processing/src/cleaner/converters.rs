//! Rank coercion from raw CSV text to numbers.

use crate::error::Result;
use crate::utils::{all_integral, is_numeric_dtype, parse_rank};
use polars::prelude::*;

/// Outcome of coercing a rank column.
#[derive(Debug, Clone)]
pub struct CoercedRank {
    pub series: Series,
    /// Cells that held text but did not parse as a number.
    pub unparsable: usize,
}

/// Convert a rank series to numbers without failing on bad values.
///
/// String cells are parsed with [`parse_rank`]; anything unparsable becomes
/// null. Numeric input is cast directly. The result is `Int64` when every
/// surviving value is a whole number and `Float64` otherwise.
pub(crate) fn coerce_rank(series: &Series) -> Result<CoercedRank> {
    let (floats, unparsable) = if is_numeric_dtype(series.dtype()) {
        (series.cast(&DataType::Float64)?, 0)
    } else {
        let as_text = series.cast(&DataType::String)?;
        let str_series = as_text.str()?;
        let mut result_vec: Vec<Option<f64>> = Vec::with_capacity(str_series.len());
        let mut unparsable = 0;

        for opt_val in str_series.into_iter() {
            match opt_val {
                Some(val) => {
                    let parsed = parse_rank(val);
                    if parsed.is_none() {
                        unparsable += 1;
                    }
                    result_vec.push(parsed);
                }
                None => result_vec.push(None),
            }
        }

        (Series::new(series.name().clone(), result_vec), unparsable)
    };

    let series = if all_integral(&floats)? {
        floats.cast(&DataType::Int64)?
    } else {
        floats
    };

    Ok(CoercedRank { series, unparsable })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_null_at(series: &Series, idx: usize) -> bool {
        matches!(series.get(idx).unwrap(), AnyValue::Null)
    }

    #[test]
    fn test_coerce_whole_numbers_to_int64() {
        let series = Series::new("rank".into(), &["1", " 2 ", "20"]);
        let result = coerce_rank(&series).unwrap();

        assert_eq!(result.series.dtype(), &DataType::Int64);
        assert_eq!(result.unparsable, 0);
        assert_eq!(result.series.get(1).unwrap().try_extract::<i64>().unwrap(), 2);
    }

    #[test]
    fn test_coerce_garbage_becomes_null() {
        let series = Series::new("rank".into(), &["5", "abc", "", "7"]);
        let result = coerce_rank(&series).unwrap();

        assert_eq!(result.series.null_count(), 2);
        assert_eq!(result.unparsable, 2);
        assert!(is_null_at(&result.series, 1));
        assert!(is_null_at(&result.series, 2));
        assert_eq!(result.series.get(3).unwrap().try_extract::<i64>().unwrap(), 7);
    }

    #[test]
    fn test_coerce_keeps_existing_nulls_uncounted() {
        let series = Series::new("rank".into(), &[Some("3"), None]);
        let result = coerce_rank(&series).unwrap();

        assert_eq!(result.unparsable, 0);
        assert!(is_null_at(&result.series, 1));
    }

    #[test]
    fn test_coerce_fractional_stays_float() {
        let series = Series::new("rank".into(), &["1.5", "2"]);
        let result = coerce_rank(&series).unwrap();

        assert_eq!(result.series.dtype(), &DataType::Float64);
        assert_eq!(
            result.series.get(0).unwrap().try_extract::<f64>().unwrap(),
            1.5
        );
    }

    #[test]
    fn test_coerce_numeric_input() {
        let series = Series::new("rank".into(), &[4_i64, 9]);
        let result = coerce_rank(&series).unwrap();

        assert_eq!(result.series.dtype(), &DataType::Int64);
        assert_eq!(result.unparsable, 0);
    }
}
