//! Shared helpers for dtype checks and rank parsing.

use polars::prelude::*;

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Parse a rank cell, returning `None` for anything that is not a number.
///
/// Surrounding whitespace is ignored. `NaN` text parses but is treated as
/// missing, matching how a null rank behaves downstream.
///
/// ```rust,ignore
/// assert_eq!(parse_rank("  7 "), Some(7.0));
/// assert_eq!(parse_rank("abc"), None);
/// ```
pub fn parse_rank(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// True when every non-null value in a float series has no fractional part.
pub fn all_integral(series: &Series) -> PolarsResult<bool> {
    let values = series.f64()?;
    Ok(values
        .into_iter()
        .flatten()
        .all(|v| v.is_finite() && v.fract() == 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rank_plain_and_padded() {
        assert_eq!(parse_rank("5"), Some(5.0));
        assert_eq!(parse_rank(" 12 "), Some(12.0));
        assert_eq!(parse_rank("3.0"), Some(3.0));
        assert_eq!(parse_rank("-1"), Some(-1.0));
    }

    #[test]
    fn test_parse_rank_rejects_garbage() {
        assert_eq!(parse_rank("abc"), None);
        assert_eq!(parse_rank(""), None);
        assert_eq!(parse_rank("   "), None);
        assert_eq!(parse_rank("5th"), None);
        assert_eq!(parse_rank("NaN"), None);
    }

    #[test]
    fn test_all_integral() {
        let ints = Series::new("rank".into(), &[Some(1.0), None, Some(20.0)]);
        assert!(all_integral(&ints).unwrap());

        let floats = Series::new("rank".into(), &[1.0, 2.5]);
        assert!(!all_integral(&floats).unwrap());
    }

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
    }
}
