//! Historical record loading and schema validation

use crate::error::{Error, Result};
use crate::feature::{StudentRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use csv::ReaderBuilder;
use std::path::Path;

/// Load historical student records from a CSV file.
///
/// The header is validated before any row is parsed: every expected
/// attribute column must be present. Extra columns are tolerated and
/// ignored, matching the original dataset which carries columns this
/// model does not use.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<StudentRecord>> {
    let mut reader = ReaderBuilder::new().from_path(path)?;

    let headers = reader.headers()?.clone();
    validate_schema(headers.iter())?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Check that a column set covers the full attribute schema.
///
/// Fails with [`Error::Schema`] listing the missing columns; any
/// unexpected columns are reported alongside as a diagnostic aid, since
/// a typo shows up as one missing plus one unexpected name.
pub fn validate_schema<'a>(columns: impl Iterator<Item = &'a str>) -> Result<()> {
    let present: Vec<&str> = columns.collect();

    let missing: Vec<String> = NUMERIC_COLUMNS
        .iter()
        .chain(CATEGORICAL_COLUMNS.iter())
        .copied()
        .filter(|expected| !present.contains(expected))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let unexpected: Vec<String> = present
        .iter()
        .filter(|col| !NUMERIC_COLUMNS.contains(col) && !CATEGORICAL_COLUMNS.contains(col))
        .map(|c| c.to_string())
        .collect();

    Err(Error::Schema { missing, unexpected })
}
