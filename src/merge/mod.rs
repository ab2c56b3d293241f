//! CSV column merge
//!
//! Copies one named column from a source CSV file into a target CSV file,
//! row by row. Rows are aligned by position, not by key.

use crate::HistoryError;
use csv::StringRecord;
use std::path::Path;

/// Column copied when none is named
pub const DEFAULT_COLUMN: &str = "crawls";

/// Copies `column` from `source` into `target` and writes the result to `output`
///
/// If the target already has the column its values are replaced, otherwise the
/// column is appended. Target rows past the end of the source get an empty
/// value; extra source rows are ignored. `output` may be the target itself.
///
/// # Returns
///
/// * `Ok(usize)` - Number of data rows written
/// * `Err(HistoryError::Merge)` - The source has no such column
pub fn copy_column(
    source: &Path,
    target: &Path,
    column: &str,
    output: &Path,
) -> Result<usize, HistoryError> {
    let mut source_reader = csv::Reader::from_path(source)?;
    let source_index = source_reader
        .headers()?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| {
            HistoryError::Merge(format!(
                "column '{}' not found in {}",
                column,
                source.display()
            ))
        })?;

    let values = source_reader
        .records()
        .map(|record| record.map(|r| r.get(source_index).unwrap_or_default().to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    // Read the whole target before writing, since output may overwrite it
    let mut target_reader = csv::ReaderBuilder::new().flexible(true).from_path(target)?;
    let mut headers = target_reader.headers()?.clone();
    let rows = target_reader
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()?;

    let target_index = headers.iter().position(|h| h == column);
    if target_index.is_none() {
        headers.push_field(column);
    }

    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(output)?;
    writer.write_record(&headers)?;

    for (i, row) in rows.iter().enumerate() {
        let value = values.get(i).map(String::as_str).unwrap_or_default();
        let merged: StringRecord = match target_index {
            Some(index) => {
                let mut fields: Vec<&str> = row.iter().collect();
                if fields.len() <= index {
                    fields.resize(index + 1, "");
                }
                fields[index] = value;
                fields.into_iter().collect()
            }
            None => {
                let mut fields = row.clone();
                fields.push_field(value);
                fields
            }
        };
        writer.write_record(&merged)?;
    }
    writer.flush()?;

    tracing::info!(
        "Copied column '{}' into {} rows of {}",
        column,
        rows.len(),
        output.display()
    );

    Ok(rows.len())
}
