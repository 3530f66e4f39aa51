use super::*;
use chrono::Duration;
use serde_json::json;

fn board(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

async fn round_trip(store: &dyn DocumentStore) {
    let shapes = json!([{"type": "circle", "x": 1, "y": 2, "radius": 3}]);
    store
        .save(board(json!({"_id": "abc", "shapes": shapes})))
        .await
        .unwrap();

    let fetched = store.get("abc").await.unwrap().expect("saved board");
    assert_eq!(fetched["_id"], json!("abc"));
    assert_eq!(fetched["shapes"], shapes);
    let created_at = fetched[CREATED_AT_FIELD].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(created_at).is_ok());
    assert!(created_at.ends_with('Z'));
}

async fn upsert_replaces(store: &dyn DocumentStore) {
    store
        .save(board(json!({"_id": "board-1", "title": "first", "extra": true})))
        .await
        .unwrap();
    store
        .save(board(json!({"_id": "board-1", "title": "second"})))
        .await
        .unwrap();

    let fetched = store.get("board-1").await.unwrap().unwrap();
    assert_eq!(fetched["title"], json!("second"));
    assert!(!fetched.contains_key("extra"));
}

async fn rejects_bad_ids(store: &dyn DocumentStore) {
    assert!(matches!(
        store.save(board(json!({"shapes": []}))).await,
        Err(StoreError::MissingId)
    ));
    assert!(matches!(
        store.save(board(json!({"_id": 42}))).await,
        Err(StoreError::InvalidId(_))
    ));
    assert!(matches!(
        store.save(board(json!({"_id": ""}))).await,
        Err(StoreError::InvalidId(_))
    ));
    assert!(store.get("missing").await.unwrap().is_none());
    assert!(store.get("").await.unwrap().is_none());
}

async fn free_form_ids(store: &dyn DocumentStore) {
    for id in ["My Board", "board.2024", "sess:1", "../escape", "ünïcode/ßlash"] {
        store
            .save(board(json!({ "_id": id, "title": id })))
            .await
            .unwrap();
        let fetched = store.get(id).await.unwrap().expect("saved board");
        assert_eq!(fetched["_id"], json!(id));
        assert_eq!(fetched["title"], json!(id));
    }
}

async fn lists_recent(store: &dyn DocumentStore) {
    for id in ["one", "two"] {
        store.save(board(json!({ "_id": id }))).await.unwrap();
    }

    let all = store
        .recent(Utc::now() - Duration::days(RECENT_WINDOW_DAYS), 10)
        .await
        .unwrap();
    let mut ids: Vec<_> = all.iter().map(|s| s.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["one", "two"]);

    let limited = store
        .recent(Utc::now() - Duration::days(1), 1)
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);

    let future = store
        .recent(Utc::now() + Duration::days(1), 10)
        .await
        .unwrap();
    assert!(future.is_empty());
}

#[tokio::test]
async fn memory_store_behaviour() {
    let store = MemoryStore::new();
    round_trip(&store).await;
    upsert_replaces(&store).await;
    rejects_bad_ids(&store).await;
    free_form_ids(&store).await;
}

#[tokio::test]
async fn memory_store_recent() {
    lists_recent(&MemoryStore::new()).await;
}

#[tokio::test]
async fn file_store_behaviour() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("boards")).await.unwrap();
    round_trip(&store).await;
    upsert_replaces(&store).await;
    rejects_bad_ids(&store).await;
    free_form_ids(&store).await;

    let path = store.path_for("abc");
    assert!(path.exists());
    assert_eq!(path.parent(), Some(store.root()));
    // ids never leave the store directory, whatever they contain
    assert_eq!(store.path_for("../escape").parent(), Some(store.root()));
    assert!(!dir.path().join("escape.json").exists());
}

#[tokio::test]
async fn file_store_recent_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileStore::open(dir.path()).await.unwrap();
        lists_recent(&store).await;
    }

    // survives a fresh handle on the same directory, stray files ignored
    std::fs::write(dir.path().join("notes.txt"), "not a board").unwrap();
    std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
    let reopened = FileStore::open(dir.path()).await.unwrap();
    assert!(reopened.get("one").await.unwrap().is_some());
    let recent = reopened
        .recent(Utc::now() - Duration::days(1), 10)
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
}

#[test]
fn select_recent_orders_newest_first() {
    let now = Utc::now();
    let entry = |id: &str, age_hours: i64| {
        (
            now - Duration::hours(age_hours),
            SessionSummary {
                id: id.to_string(),
                created_at: String::new(),
            },
        )
    };

    let picked = select_recent(
        vec![entry("old", 200), entry("mid", 5), entry("new", 1)],
        now - Duration::days(RECENT_WINDOW_DAYS),
        10,
    );
    let ids: Vec<_> = picked.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid"]);
}

#[test]
fn only_empty_ids_are_invalid() {
    assert!(validate_id("4f1c-board_2").is_ok());
    assert!(validate_id("My Board").is_ok());
    assert!(validate_id(&"x".repeat(500)).is_ok());
    assert!(validate_id("").is_err());
}
