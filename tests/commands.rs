use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use csv_user_ingest::commands::{clear_users, health, list_users, report};
use csv_user_ingest::pipeline::{process_path, PipelineOptions};
use csv_user_ingest::store::{ParquetStore, RowStore};
use serde_json::json;

fn tmp_file(tag: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    std::env::temp_dir().join(format!("csv-user-ingest-{tag}-{nanos}.parquet"))
}

#[test]
fn commands_see_rows_persisted_by_an_earlier_process_run() {
    let path = tmp_file("commands");

    let mut store = ParquetStore::new(&path);
    process_path("tests/fixtures/users.csv", &mut store, &PipelineOptions::default()).unwrap();
    store.shutdown().unwrap();

    let mut store = ParquetStore::new(&path);
    store.initialize().unwrap();
    let users = list_users(&store).unwrap();
    assert_eq!(users.count, 4);
    assert_eq!(users.users[0].name, "Alice");
    assert_eq!(
        serde_json::to_value(report(&store).unwrap()).unwrap(),
        json!({"distribution": {"< 20": "0.00", "20 to 40": "25.00", "40 to 60": "25.00", "> 60": "50.00"}})
    );

    clear_users(&mut store).unwrap();
    store.shutdown().unwrap();

    let mut store = ParquetStore::new(&path);
    store.initialize().unwrap();
    assert_eq!(list_users(&store).unwrap().count, 0);
    store.shutdown().unwrap();
    let _ = std::fs::remove_file(&path);
}

#[test]
fn health_reports_an_unreadable_store_file() {
    let path = tmp_file("corrupt");
    std::fs::write(&path, b"not a parquet file").unwrap();

    let mut store = ParquetStore::new(&path);
    let body = health(&mut store);
    let _ = std::fs::remove_file(&path);

    assert!(!body.is_ok());
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["status"], json!("Error"));
    assert!(json["error"].as_str().unwrap().starts_with("parquet error"));
}
