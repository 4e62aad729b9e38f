use crate::{error::AppError, models::TableStats, state::AppState};

/// Destructive full clear. The caller is responsible for asking the user
/// first.
pub fn clear_table(state: &AppState) -> Result<(), AppError> {
    state.store.clear()
}

/// The dashboard numbers: row count, confirmed count, column set, and the
/// metadata of the last import.
pub fn table_stats(state: &AppState) -> Result<TableStats, AppError> {
    Ok(TableStats {
        total_rows: state.store.len(),
        confirmed_rows: state.store.confirmed_count(),
        columns: state.store.columns(),
        meta: state.store.meta(),
    })
}
