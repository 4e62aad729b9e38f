use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tabledeck::{
    commands, models::TableEvent, AppError, AppState, ImportPipeline, ImportStage, TableStore,
};

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn state_in(dir: &tempfile::TempDir) -> AppState {
    AppState::new(&dir.path().join("data")).unwrap()
}

#[test]
fn import_drops_blank_rows_and_persists_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir);
    let file = write_file(&dir, "people.csv", "Name,Age\nAlice,30\n,\n");

    let outcome = commands::import_file(&state, &file).unwrap();
    assert_eq!(outcome.rows_imported, 1);
    assert_eq!(outcome.columns, vec!["Name", "Age"]);
    assert_eq!(state.pipeline.stage(), ImportStage::Done);

    let snapshot = state.store.get_all();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].data["Name"], Value::String("Alice".into()));
    assert_eq!(snapshot[0].data["Age"], Value::String("30".into()));

    let meta = state.store.meta().unwrap();
    assert_eq!(meta.source_name, "people.csv");
    assert_eq!(meta.total_records, 1);
}

#[test]
fn unsupported_extension_fails_without_touching_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir);
    let good = write_file(&dir, "people.csv", "Name\nAlice\n");
    commands::import_file(&state, &good).unwrap();

    let bad = write_file(&dir, "notes.txt", "hello");
    let err = commands::import_file(&state, &bad).unwrap_err();
    assert!(matches!(err, AppError::UnsupportedFormat(ext) if ext == "txt"));
    assert_eq!(state.pipeline.stage(), ImportStage::Failed);
    assert_eq!(state.store.len(), 1);

    // A failure is terminal for the attempt only; the next import runs.
    commands::import_file(&state, &good).unwrap();
    assert_eq!(state.pipeline.stage(), ImportStage::Done);
}

#[test]
fn all_blank_file_reports_no_valid_data() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir);
    let good = write_file(&dir, "people.csv", "Name\nAlice\n");
    commands::import_file(&state, &good).unwrap();

    let blank = write_file(&dir, "blank.csv", "Name,Age\n,\n,\n");
    let err = commands::import_file(&state, &blank).unwrap_err();
    assert!(matches!(err, AppError::NoValidData));
    assert_eq!(state.pipeline.stage(), ImportStage::Failed);
    assert_eq!(state.store.len(), 1);
}

#[test]
fn corrupt_workbook_reports_processing_error_and_keeps_table() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir);
    let good = write_file(&dir, "people.csv", "Name\nAlice\n");
    commands::import_file(&state, &good).unwrap();

    let corrupt = dir.path().join("broken.xlsx");
    fs::write(&corrupt, b"not a workbook").unwrap();
    let err = commands::import_file(&state, &corrupt).unwrap_err();
    assert!(matches!(err, AppError::FileProcessing(_)));
    assert_eq!(state.store.len(), 1);
}

#[test]
fn a_second_import_replaces_the_table_with_fresh_identities() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir);
    let first = write_file(&dir, "first.csv", "Name\nAlice\nBob\n");
    commands::import_file(&state, &first).unwrap();
    let first_ids: Vec<u64> = state.store.get_all().iter().map(|r| r.id).collect();

    let second = write_file(&dir, "second.csv", "City\nBerlin\n");
    commands::import_file(&state, &second).unwrap();

    let snapshot = state.store.get_all();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].data["City"], Value::String("Berlin".into()));
    assert!(!first_ids.contains(&snapshot[0].id));
    assert_eq!(state.store.columns(), vec!["City", "Confirmed"]);
}

#[test]
fn an_import_started_mid_replace_is_rejected_as_busy() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(TableStore::open(&dir.path().join("data")).unwrap());
    let pipeline = Arc::new(ImportPipeline::new());
    let file = write_file(&dir, "people.csv", "Name\nAlice\n");

    // The store notifies while the pipeline is still in its persisting stage,
    // so a reentrant import from a consumer must hit the busy guard.
    let reentrant: Arc<Mutex<Option<AppError>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&reentrant);
    let inner_store = Arc::clone(&store);
    let inner_pipeline = Arc::clone(&pipeline);
    let inner_file = file.clone();
    store.subscribe(Box::new(move |event| {
        if matches!(event, TableEvent::Replaced { .. }) {
            if let Err(err) = inner_pipeline.import(&inner_store, &inner_file) {
                *sink.lock() = Some(err);
            }
        }
    }));

    pipeline.import(&store, &file).unwrap();
    let captured = reentrant.lock().take().expect("reentrant import ran");
    assert!(matches!(captured, AppError::Message(msg) if msg.contains("already in progress")));
}

#[test]
fn search_and_confirm_flow() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir);
    let file = write_file(&dir, "people.csv", "Name,Age\nAlice,30\nBob,41\n");
    commands::import_file(&state, &file).unwrap();

    let hits = commands::query_rows(&state, Some("ali"), None).unwrap();
    assert_eq!(hits.matched_rows, 1);
    assert_eq!(hits.total_rows, 2);
    assert_eq!(hits.rows[0].data["Name"], Value::String("Alice".into()));

    let alice = hits.rows[0].id;
    let confirmed = commands::confirm_row(&state, alice).unwrap();
    assert!(confirmed.is_confirmed());

    let details = commands::get_row(&state, alice).unwrap();
    assert_eq!(details.data["Age"], Value::String("30".into()));

    let stats = commands::table_stats(&state).unwrap();
    assert_eq!(stats.total_rows, 2);
    assert_eq!(stats.confirmed_rows, 1);
    assert_eq!(stats.columns, vec!["Name", "Age", "Confirmed"]);

    let err = commands::confirm_row(&state, 9999).unwrap_err();
    assert!(matches!(err, AppError::RecordNotFound(9999)));
}

#[test]
fn export_round_trips_through_the_import_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir);

    let err = commands::export_table(&state, None).unwrap_err();
    assert!(matches!(err, AppError::Message(msg) if msg.contains("no data")));

    let file = write_file(&dir, "people.csv", "Name,Age\nAlice,30\n");
    commands::import_file(&state, &file).unwrap();
    let alice = state.store.get_all()[0].id;
    commands::confirm_row(&state, alice).unwrap();

    let destination = dir.path().join("exported_data.xlsx");
    let written = commands::export_table(&state, Some(&destination)).unwrap();
    assert_eq!(written, destination);

    // The exported workbook is itself importable; the identity column never
    // leaks into the file, while the confirmation does.
    commands::import_file(&state, &destination).unwrap();
    let snapshot = state.store.get_all();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].data["Name"], Value::String("Alice".into()));
    assert_eq!(
        snapshot[0].data["Confirmed"],
        Value::String("YES".into())
    );
    assert!(!snapshot[0].data.contains_key("id"));
}

#[test]
fn clear_then_get_all_returns_an_empty_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir);
    let file = write_file(&dir, "people.csv", "Name\nAlice\n");
    commands::import_file(&state, &file).unwrap();

    commands::clear_table(&state).unwrap();
    assert!(state.store.get_all().is_empty());

    let stats = commands::table_stats(&state).unwrap();
    assert_eq!(stats.total_rows, 0);
    assert!(stats.columns.is_empty());
}
