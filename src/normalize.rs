use std::collections::HashMap;

use serde_json::Value;

use crate::{error::AppError, value_utils::value_is_blank};

/// Keeps only records with at least one non-blank field, preserving order.
/// Refuses to hand back an empty table: persisting a table of blank rows is
/// never useful, so zero survivors is an error even when the input had rows.
pub fn drop_blank_records(
    rows: Vec<HashMap<String, Value>>,
) -> Result<Vec<HashMap<String, Value>>, AppError> {
    let kept: Vec<HashMap<String, Value>> = rows
        .into_iter()
        .filter(|row| row.values().any(|value| !value_is_blank(value)))
        .collect();

    if kept.is_empty() {
        return Err(AppError::NoValidData);
    }
    Ok(kept)
}
