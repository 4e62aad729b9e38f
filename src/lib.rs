//! Local tabular data triage: import CSV/Excel files into a persistent table,
//! search across all columns, confirm rows, export back out as a workbook.

pub mod adapter;
pub mod commands;
pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod search;
pub mod state;
pub mod store;
pub mod value_utils;

pub use error::AppError;
pub use models::{ImportOutcome, Record, TableEvent, TableMeta, TableStats};
pub use pipeline::{ImportPipeline, ImportStage};
pub use state::AppState;
pub use store::TableStore;
