use serde::Serialize;

use crate::{
    error::AppError,
    models::Record,
    search::filter_records,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct QueryRowsResponse {
    pub rows: Vec<Record>,
    pub total_rows: usize,
    pub matched_rows: usize,
}

/// Returns the current snapshot filtered by a search-as-you-type query, in
/// insertion order. No query means the full table.
pub fn query_rows(
    state: &AppState,
    search: Option<&str>,
    limit: Option<usize>,
) -> Result<QueryRowsResponse, AppError> {
    let snapshot = state.store.get_all();
    let total_rows = snapshot.len();

    let mut rows = match search {
        Some(query) => filter_records(&snapshot, query),
        None => snapshot,
    };
    let matched_rows = rows.len();
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    Ok(QueryRowsResponse {
        rows,
        total_rows,
        matched_rows,
    })
}

/// Fetches a single record for the details view.
pub fn get_row(state: &AppState, id: u64) -> Result<Record, AppError> {
    state.store.find(id).ok_or(AppError::RecordNotFound(id))
}
