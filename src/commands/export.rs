use std::path::{Path, PathBuf};

use crate::{
    error::AppError,
    export::{write_workbook, DEFAULT_EXPORT_NAME},
    state::AppState,
};

/// Serializes the current snapshot to a spreadsheet workbook. Stateless and
/// read-only: a failed export leaves the table exactly as it was.
pub fn export_table(state: &AppState, destination: Option<&Path>) -> Result<PathBuf, AppError> {
    let records = state.store.get_all();
    if records.is_empty() {
        return Err(AppError::Message("no data to export".into()));
    }
    let columns = state.store.columns();
    let destination = destination
        .map(|path| path.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_NAME));
    write_workbook(&columns, &records, &destination)?;
    Ok(destination)
}
