use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Context};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use serde_json::Value;

use crate::{
    error::AppError,
    models::ParsedTable,
    value_utils::{cell_has_value, cell_to_value, value_to_search_string},
};

/// Reads a tabular file into header-order columns plus raw records, selecting
/// the strategy by extension. Rows are not yet filtered for blankness; the
/// normalizer does that. Spreadsheet rows with no defined cell at all are the
/// one exception and are dropped here, before normalization.
pub fn read_table(path: &Path) -> Result<ParsedTable, AppError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_delimited(path),
        "xlsx" | "xls" => read_workbook(path),
        other => Err(AppError::UnsupportedFormat(other.to_string())),
    }
}

/// Delimited-text strategy: header row becomes the field names, each following
/// line one record. The reader skips fully empty lines itself; a line of bare
/// separators still yields a record of empty strings. Short rows stay sparse.
fn read_delimited(path: &Path) -> Result<ParsedTable, AppError> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file {:?}", path))
        .map_err(AppError::FileProcessing)?;

    let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
    let columns: Vec<String> = reader
        .headers()
        .map_err(|err| AppError::FileProcessing(err.into()))?
        .iter()
        .map(|header| header.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| AppError::FileProcessing(err.into()))?;
        let mut row: HashMap<String, Value> = HashMap::new();
        for (column, field) in columns.iter().zip(record.iter()) {
            row.insert(column.clone(), Value::String(field.to_string()));
        }
        rows.push(row);
    }

    Ok(ParsedTable { columns, rows })
}

/// Spreadsheet strategy: declared used range of the first sheet only. The
/// first row of the range supplies the headers; an empty header cell gets the
/// placeholder name `Column<N>` from its 1-indexed position. Every data row
/// carries the full range width, with empty cells recorded as "".
fn read_workbook(path: &Path) -> Result<ParsedTable, AppError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|err| AppError::FileProcessing(err.into()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::FileProcessing(anyhow!("workbook has no worksheets")))?
        .map_err(|err| AppError::FileProcessing(err.into()))?;

    let start_col = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let mut sheet_rows = range.rows();

    let Some(header_row) = sheet_rows.next() else {
        // Absent used range: zero columns, zero data rows.
        return Ok(ParsedTable {
            columns: Vec::new(),
            rows: Vec::new(),
        });
    };

    // Headers are not de-duplicated; two identical names collide into one key
    // and the later column wins within each record.
    let columns: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let header = value_to_search_string(&cell_to_value(cell)).unwrap_or_default();
            if header.is_empty() {
                format!("Column{}", start_col + idx + 1)
            } else {
                header
            }
        })
        .collect();

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        let mut row: HashMap<String, Value> = HashMap::new();
        let mut has_data = false;
        for (idx, column) in columns.iter().enumerate() {
            let value = match sheet_row.get(idx) {
                Some(cell) => {
                    if cell_has_value(cell) {
                        has_data = true;
                    }
                    cell_to_value(cell)
                }
                None => Value::String(String::new()),
            };
            row.insert(column.clone(), value);
        }
        // A row whose every cell is undefined never reaches the store.
        if has_data {
            rows.push(row);
        }
    }

    Ok(ParsedTable { columns, rows })
}
