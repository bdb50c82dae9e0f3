//! CSV loading and writing for chart tables.

use crate::error::{ChartError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Read a chart CSV with a header row.
///
/// Every column is read as text (schema inference disabled) so columns the
/// transform does not touch are written back exactly as they were read.
pub fn load_chart_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    // Open first so a missing file surfaces as an IO error, not a parser error.
    File::open(path).context(format!("Opening '{}'", shown))?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Reading '{}'", shown))?
        .finish()
        .context(format!("Parsing '{}'", shown))?;

    info!("Loaded {} rows x {} columns from {}", df.height(), df.width(), shown);
    Ok(df)
}

/// Fail with `ColumnNotFound` for the first required column the table lacks.
pub fn ensure_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    for name in required {
        if df.column(name).is_err() {
            return Err(ChartError::ColumnNotFound(name.to_string()));
        }
    }
    Ok(())
}

/// Write a chart table as comma-separated CSV with a header row.
///
/// Any existing file at `path` is replaced; a missing parent directory is
/// created.
pub fn write_chart_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).context(format!("Creating '{}'", parent.display()))?;
        debug!("Created output directory: {}", parent.display());
    }

    let file = File::create(path).context(format!("Creating '{}'", shown))?;
    write_chart_table(df, file).context(format!("Writing '{}'", shown))?;

    info!("Wrote {} rows to {}", df.height(), shown);
    Ok(())
}

/// Write every row and column of `df` as CSV to `writer`.
///
/// Used for both the output file and the stdout table, so nothing is
/// elided the way `DataFrame`'s `Display` elides long tables.
pub fn write_chart_table<W: Write>(df: &mut DataFrame, mut writer: W) -> Result<()> {
    CsvWriter::new(&mut writer)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)?;
    writer.flush()?;
    Ok(())
}
