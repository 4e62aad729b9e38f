use std::collections::HashMap;

use serde_json::Value;

use crate::{
    error::AppError,
    models::{Record, CONFIRMED_COLUMN, CONFIRMED_VALUE},
    state::AppState,
};

/// Marks a single row as confirmed. This is an ordinary single-field merge:
/// every other field of the record stays untouched.
pub fn confirm_row(state: &AppState, id: u64) -> Result<Record, AppError> {
    let mut patch: HashMap<String, Value> = HashMap::new();
    patch.insert(
        CONFIRMED_COLUMN.to_string(),
        Value::String(CONFIRMED_VALUE.to_string()),
    );
    state.store.update_one(id, patch)
}
