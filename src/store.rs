use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde_json::Value;
use sled::{Batch, Db};

use crate::{
    error::AppError,
    models::{Record, TableEvent, TableMeta, CONFIRMED_COLUMN},
};

const ROW_KEY_PREFIX: &[u8] = b"row/";
const COLUMNS_KEY: &[u8] = b"meta/columns";
const TABLE_META_KEY: &[u8] = b"meta/table";
const NEXT_ID_KEY: &[u8] = b"meta/next_id";

fn encode_row_key(id: u64) -> [u8; 12] {
    let mut key = [0u8; 12];
    key[..4].copy_from_slice(ROW_KEY_PREFIX);
    key[4..].copy_from_slice(&id.to_be_bytes());
    key
}

fn decode_row_key(bytes: &[u8]) -> Option<u64> {
    if bytes.len() != 12 || !bytes.starts_with(ROW_KEY_PREFIX) {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[4..]);
    Some(u64::from_be_bytes(buf))
}

pub type Subscriber = Box<dyn Fn(&TableEvent) + Send + Sync>;

struct SubscriberRegistry {
    next_token: u64,
    entries: Vec<(u64, Subscriber)>,
}

struct TableState {
    rows: Vec<Record>,
    columns: Vec<String>,
    meta: Option<TableMeta>,
    next_id: u64,
}

/// The one stateful component: an ordered collection of records persisted in
/// sled, mirrored by an in-memory snapshot behind a mutex. Readers always see
/// a whole snapshot; the disk side of a replace is a single batch, so a crash
/// mid-import also lands on either the old table or the new one.
pub struct TableStore {
    db: Db,
    state: Mutex<TableState>,
    subscribers: Mutex<SubscriberRegistry>,
}

impl TableStore {
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create data dir {:?}", dir))?;
        let db_path = dir.join("table.db");
        let db = sled::open(&db_path)
            .with_context(|| format!("failed to open table db at {:?}", db_path))?;

        let mut rows = Vec::new();
        for result in db.scan_prefix(ROW_KEY_PREFIX) {
            let (key, value) = result.with_context(|| "failed to iterate stored rows")?;
            let Some(id) = decode_row_key(key.as_ref()) else {
                continue;
            };
            let data: HashMap<String, Value> = serde_json::from_slice(&value)
                .with_context(|| format!("failed to deserialize row {}", id))?;
            rows.push(Record { id, data });
        }

        let columns: Vec<String> = match db.get(COLUMNS_KEY).context("failed to read columns")? {
            Some(value) => {
                serde_json::from_slice(&value).context("failed to parse stored columns")?
            }
            None => Vec::new(),
        };
        let meta: Option<TableMeta> =
            match db.get(TABLE_META_KEY).context("failed to read table meta")? {
                Some(value) => {
                    Some(serde_json::from_slice(&value).context("failed to parse table meta")?)
                }
                None => None,
            };
        let next_id = match db.get(NEXT_ID_KEY).context("failed to read id counter")? {
            Some(value) if value.len() == 8 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&value);
                u64::from_be_bytes(buf)
            }
            _ => rows.last().map(|record| record.id + 1).unwrap_or(0),
        };

        Ok(Self {
            db,
            state: Mutex::new(TableState {
                rows,
                columns,
                meta,
                next_id,
            }),
            subscribers: Mutex::new(SubscriberRegistry {
                next_token: 0,
                entries: Vec::new(),
            }),
        })
    }

    /// Full snapshot in insertion order. Never fails; an empty table is an
    /// empty sequence.
    pub fn get_all(&self) -> Vec<Record> {
        self.state.lock().rows.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current column set: import header order plus a synthesized
    /// `Confirmed` column when absent. Empty table, empty set.
    pub fn columns(&self) -> Vec<String> {
        let state = self.state.lock();
        if state.rows.is_empty() {
            return Vec::new();
        }
        let mut columns = state.columns.clone();
        if !columns.iter().any(|column| column == CONFIRMED_COLUMN) {
            columns.push(CONFIRMED_COLUMN.to_string());
        }
        columns
    }

    pub fn meta(&self) -> Option<TableMeta> {
        self.state.lock().meta.clone()
    }

    pub fn confirmed_count(&self) -> usize {
        self.state
            .lock()
            .rows
            .iter()
            .filter(|record| record.is_confirmed())
            .count()
    }

    pub fn find(&self, id: u64) -> Option<Record> {
        self.state
            .lock()
            .rows
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    /// Discards the current table and inserts `rows` as new records with
    /// freshly assigned identities, in the given order. Disk writes go through
    /// one batch and the snapshot swaps under the lock, so no reader observes
    /// the gap between clear and insert.
    pub fn replace_all(
        &self,
        columns: Vec<String>,
        rows: Vec<HashMap<String, Value>>,
        meta: TableMeta,
    ) -> Result<usize, AppError> {
        let total = rows.len();
        {
            let mut state = self.state.lock();

            let mut batch = Batch::default();
            for record in &state.rows {
                batch.remove(encode_row_key(record.id).to_vec());
            }

            let first_id = state.next_id;
            let mut new_rows = Vec::with_capacity(total);
            for (offset, data) in rows.into_iter().enumerate() {
                let id = first_id + offset as u64;
                let value = serde_json::to_vec(&data)
                    .with_context(|| format!("failed to serialize row {}", id))?;
                batch.insert(encode_row_key(id).to_vec(), value);
                new_rows.push(Record { id, data });
            }
            let next_id = first_id + total as u64;

            batch.insert(
                COLUMNS_KEY,
                serde_json::to_vec(&columns).context("failed to serialize columns")?,
            );
            batch.insert(
                TABLE_META_KEY,
                serde_json::to_vec(&meta).context("failed to serialize table meta")?,
            );
            batch.insert(NEXT_ID_KEY, next_id.to_be_bytes().to_vec());

            self.db
                .apply_batch(batch)
                .context("failed to persist replaced table")?;
            self.db.flush().context("failed to flush table db")?;

            state.rows = new_rows;
            state.columns = columns;
            state.meta = Some(meta);
            state.next_id = next_id;
        }
        self.notify(&TableEvent::Replaced { total_rows: total });
        Ok(total)
    }

    /// Merges `patch` into the record with the given identity: fields present
    /// overwrite, fields absent stay untouched. A stale id fails with
    /// `RecordNotFound` and leaves the table unchanged.
    pub fn update_one(
        &self,
        id: u64,
        patch: HashMap<String, Value>,
    ) -> Result<Record, AppError> {
        let updated = {
            let mut state = self.state.lock();
            let Some(record) = state.rows.iter_mut().find(|record| record.id == id) else {
                return Err(AppError::RecordNotFound(id));
            };

            let mut merged = record.data.clone();
            for (field, value) in patch {
                merged.insert(field, value);
            }

            let bytes = serde_json::to_vec(&merged)
                .with_context(|| format!("failed to serialize row {}", id))?;
            self.db
                .insert(encode_row_key(id).as_ref(), bytes)
                .with_context(|| format!("failed to persist row {}", id))?;
            self.db.flush().context("failed to flush table db")?;

            record.data = merged;
            record.clone()
        };
        self.notify(&TableEvent::Updated { id });
        Ok(updated)
    }

    /// Removes every record and the table metadata. The identity counter is
    /// not reset: identities stay unique for the lifetime of the store.
    pub fn clear(&self) -> Result<(), AppError> {
        {
            let mut state = self.state.lock();

            let mut batch = Batch::default();
            for record in &state.rows {
                batch.remove(encode_row_key(record.id).to_vec());
            }
            batch.remove(COLUMNS_KEY);
            batch.remove(TABLE_META_KEY);

            self.db
                .apply_batch(batch)
                .context("failed to clear table")?;
            self.db.flush().context("failed to flush table db")?;

            state.rows.clear();
            state.columns.clear();
            state.meta = None;
        }
        self.notify(&TableEvent::Cleared);
        Ok(())
    }

    /// Registers a snapshot-changed callback and returns its token. Consumers
    /// re-fetch `get_all` on each event instead of patching their own copy.
    pub fn subscribe(&self, callback: Subscriber) -> u64 {
        let mut registry = self.subscribers.lock();
        let token = registry.next_token;
        registry.next_token += 1;
        registry.entries.push((token, callback));
        token
    }

    pub fn unsubscribe(&self, token: u64) {
        self.subscribers
            .lock()
            .entries
            .retain(|(entry_token, _)| *entry_token != token);
    }

    // Called with the state lock released so a subscriber may read back.
    fn notify(&self, event: &TableEvent) {
        let registry = self.subscribers.lock();
        for (_, callback) in registry.entries.iter() {
            callback(event);
        }
    }
}
