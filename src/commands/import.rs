use std::path::Path;

use crate::{error::AppError, models::ImportOutcome, state::AppState};

/// Runs the import pipeline for a selected file, replacing the whole table on
/// success. Errors report a single user-visible message; the previous table
/// survives every failure and import can be retried immediately.
pub fn import_file(state: &AppState, path: &Path) -> Result<ImportOutcome, AppError> {
    let outcome = state.pipeline.import(&state.store, path)?;
    println!(
        "[debug] import_file source={:?} rows={} columns={}",
        path.file_name().unwrap_or_default(),
        outcome.rows_imported,
        outcome.columns.len()
    );
    Ok(outcome)
}
