mod confirm;
mod export;
mod import;
mod rows;
mod table;

pub use confirm::confirm_row;
pub use export::export_table;
pub use import::import_file;
pub use rows::{get_row, query_rows, QueryRowsResponse};
pub use table::{clear_table, table_stats};
