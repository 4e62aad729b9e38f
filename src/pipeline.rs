use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;

use crate::{
    adapter::read_table,
    error::AppError,
    models::{ImportOutcome, TableMeta},
    normalize::drop_blank_records,
    store::TableStore,
};

/// Stages of a single import attempt. `Done` and `Failed` are terminal for
/// the attempt; the next call to `import` starts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Idle,
    Parsing,
    Normalizing,
    Persisting,
    Done,
    Failed,
}

impl ImportStage {
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Parsing | Self::Normalizing | Self::Persisting)
    }
}

/// Orchestrates file → adapter → normalizer → store replace. One import at a
/// time: a second call while a stage is in flight is rejected instead of being
/// left undefined, which is the library side of "disable the upload control".
pub struct ImportPipeline {
    stage: Mutex<ImportStage>,
}

impl Default for ImportPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportPipeline {
    pub fn new() -> Self {
        Self {
            stage: Mutex::new(ImportStage::Idle),
        }
    }

    pub fn stage(&self) -> ImportStage {
        *self.stage.lock()
    }

    fn begin(&self) -> Result<(), AppError> {
        let mut stage = self.stage.lock();
        if stage.is_in_flight() {
            return Err(AppError::Message(
                "an import is already in progress".into(),
            ));
        }
        *stage = ImportStage::Parsing;
        Ok(())
    }

    fn advance(&self, next: ImportStage) {
        *self.stage.lock() = next;
    }

    fn fail<T>(&self, err: AppError) -> Result<T, AppError> {
        self.advance(ImportStage::Failed);
        Err(err)
    }

    /// Runs one import attempt end to end. The store is only touched in the
    /// persisting stage, so a parse or normalization failure leaves the
    /// previous table fully intact.
    pub fn import(&self, store: &TableStore, path: &Path) -> Result<ImportOutcome, AppError> {
        self.begin()?;

        let parsed = match read_table(path) {
            Ok(parsed) => parsed,
            Err(err) => return self.fail(err),
        };

        self.advance(ImportStage::Normalizing);
        let rows = match drop_blank_records(parsed.rows) {
            Ok(rows) => rows,
            Err(err) => return self.fail(err),
        };

        self.advance(ImportStage::Persisting);
        let meta = TableMeta {
            source_name: path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "imported file".to_string()),
            imported_at: Utc::now(),
            total_records: rows.len(),
        };
        let columns = parsed.columns.clone();
        let rows_imported = match store.replace_all(parsed.columns, rows, meta) {
            Ok(total) => total,
            Err(err) => return self.fail(err),
        };

        self.advance(ImportStage::Done);
        Ok(ImportOutcome {
            rows_imported,
            columns,
        })
    }
}
