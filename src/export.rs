use std::path::Path;

use anyhow::Context;
use rust_xlsxwriter::Workbook;
use serde_json::Value;

use crate::{error::AppError, models::Record};

pub const DEFAULT_EXPORT_NAME: &str = "exported_data.xlsx";
const EXPORT_SHEET_NAME: &str = "Data";

/// Writes the snapshot to a single-sheet workbook: header row from the column
/// set (identity never present), one row per record in snapshot order. Numbers
/// stay numbers, everything else is written as text, missing fields stay
/// blank. Read-only with respect to the store.
pub fn write_workbook(
    columns: &[String],
    records: &[Record],
    destination: &Path,
) -> Result<(), AppError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(EXPORT_SHEET_NAME)
        .context("failed to name export sheet")?;

    for (col_idx, column) in columns.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, column)
            .context("failed to write export header")?;
    }

    for (row_idx, record) in records.iter().enumerate() {
        let sheet_row = row_idx as u32 + 1;
        for (col_idx, column) in columns.iter().enumerate() {
            let Some(value) = record.data.get(column) else {
                continue;
            };
            let sheet_col = col_idx as u16;
            match value {
                Value::Number(number) => {
                    let as_float = number.as_f64().unwrap_or_default();
                    worksheet
                        .write_number(sheet_row, sheet_col, as_float)
                        .context("failed to write export cell")?;
                }
                Value::String(text) => {
                    if !text.is_empty() {
                        worksheet
                            .write_string(sheet_row, sheet_col, text)
                            .context("failed to write export cell")?;
                    }
                }
                Value::Null => {}
                other => {
                    worksheet
                        .write_string(sheet_row, sheet_col, &other.to_string())
                        .context("failed to write export cell")?;
                }
            }
        }
    }

    workbook
        .save(destination)
        .with_context(|| format!("failed to save export file {:?}", destination))?;
    Ok(())
}
