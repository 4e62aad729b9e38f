use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column holding the user confirmation mark. Synthesized into the column set
/// when absent; ordinary data inside a record otherwise.
pub const CONFIRMED_COLUMN: &str = "Confirmed";

/// Value written by a confirmation.
pub const CONFIRMED_VALUE: &str = "YES";

/// One stored row: an opaque auto-assigned identity plus a flat string-keyed
/// map of primitive values. The identity lives beside the data, never in it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Record {
    pub id: u64,
    pub data: HashMap<String, Value>,
}

impl Record {
    pub fn is_confirmed(&self) -> bool {
        self.data
            .get(CONFIRMED_COLUMN)
            .and_then(|value| value.as_str())
            .map(|text| text == CONFIRMED_VALUE)
            .unwrap_or(false)
    }
}

/// Adapter output: header-order column list and raw (not yet normalized) rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<HashMap<String, Value>>,
}

/// Metadata persisted alongside the table, replaced on every import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableMeta {
    pub source_name: String,
    pub imported_at: DateTime<Utc>,
    pub total_records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub rows_imported: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableStats {
    pub total_rows: usize,
    pub confirmed_rows: usize,
    pub columns: Vec<String>,
    pub meta: Option<TableMeta>,
}

/// Emitted by the store after each successful mutation; consumers re-fetch the
/// snapshot rather than patching their own copy.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    Replaced { total_rows: usize },
    Updated { id: u64 },
    Cleared,
}
