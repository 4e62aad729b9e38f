use std::path::Path;

use anyhow::Result;

use crate::{pipeline::ImportPipeline, store::TableStore};

pub struct AppState {
    pub store: TableStore,
    pub pipeline: ImportPipeline,
}

impl AppState {
    pub fn new(data_dir: &Path) -> Result<Self> {
        let store = TableStore::open(data_dir)?;
        Ok(Self {
            store,
            pipeline: ImportPipeline::new(),
        })
    }
}
