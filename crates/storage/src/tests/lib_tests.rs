use super::*;

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn missing_slot_loads_as_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let slot = storage.load_slot("participants").await.expect("load");
    assert!(slot.is_none());
}

#[tokio::test]
async fn saved_slot_is_returned_verbatim() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let payload = r#"[{"name":"Alice","team":"infra"}]"#;
    storage
        .save_slot("participants", payload)
        .await
        .expect("save");

    let slot = storage
        .load_slot("participants")
        .await
        .expect("load")
        .expect("slot present");
    assert_eq!(slot.name, "participants");
    assert_eq!(slot.payload, payload);
}

#[tokio::test]
async fn saving_twice_overwrites_the_slot() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.save_slot("participants", "[]").await.expect("first");
    storage
        .save_slot("participants", r#"[{"name":"Bob"}]"#)
        .await
        .expect("second");

    let slot = storage
        .load_slot("participants")
        .await
        .expect("load")
        .expect("slot present");
    assert_eq!(slot.payload, r#"[{"name":"Bob"}]"#);
    assert_eq!(storage.list_slots().await.expect("list").len(), 1);
}

#[tokio::test]
async fn clear_slot_reports_whether_anything_was_removed() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(!storage.clear_slot("participants").await.expect("clear empty"));

    storage.save_slot("participants", "[]").await.expect("save");
    assert!(storage.clear_slot("participants").await.expect("clear"));
    assert!(storage
        .load_slot("participants")
        .await
        .expect("load")
        .is_none());
}

#[tokio::test]
async fn list_slots_reports_payload_sizes() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.save_slot("b", "12345").await.expect("save b");
    storage.save_slot("a", "").await.expect("save a");

    let slots = storage.list_slots().await.expect("list");
    let summary: Vec<(&str, u64)> = slots
        .iter()
        .map(|s| (s.name.as_str(), s.size_bytes))
        .collect();
    assert_eq!(summary, vec![("a", 0), ("b", 5)]);
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("picker.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    storage.save_slot("participants", "[]").await.expect("save");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[test]
fn memory_urls_have_no_path() {
    assert!(sqlite_path("sqlite::memory:").is_none());
    assert!(sqlite_path("postgres://localhost/db").is_none());
    assert_eq!(
        sqlite_path("sqlite://./data/picker.db?mode=rwc"),
        Some(PathBuf::from("./data/picker.db"))
    );
}
