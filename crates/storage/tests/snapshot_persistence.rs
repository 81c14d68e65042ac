use storage::Storage;

#[tokio::test]
async fn snapshot_survives_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("picker.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let payload = r#"[{"name":"Alice"},{"name":"Bob"}]"#;
    {
        let storage = Storage::new(&database_url).await.expect("first open");
        storage
            .save_slot("participants", payload)
            .await
            .expect("save");
    }

    let reopened = Storage::new(&database_url).await.expect("second open");
    let slot = reopened
        .load_slot("participants")
        .await
        .expect("load")
        .expect("slot survives restart");
    assert_eq!(slot.payload, payload);

    assert!(reopened.clear_slot("participants").await.expect("clear"));
    drop(reopened);

    let third = Storage::new(&database_url).await.expect("third open");
    assert!(third
        .load_slot("participants")
        .await
        .expect("load")
        .is_none());
}
