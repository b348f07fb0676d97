use dirhealth_doc_core::timestamp::Timestamp;

use crate::error::StoreError;
use crate::{FileSuppressionStore, MemorySuppressionStore, SuppressionStore};

#[test_log::test(tokio::test)]
async fn missing_file_is_empty_history() {
    let dir = tempfile::tempdir().expect("Tempdir");
    let store = FileSuppressionStore::open(dir.path().join("state.json"))
        .await
        .expect("Opens");
    assert_eq!(store.get("anything"), None);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn state_survives_reopening() {
    let dir = tempfile::tempdir().expect("Tempdir");
    let path = dir.path().join("nested").join("state.json");

    let mut store = FileSuppressionStore::open(&path).await.expect("Opens");
    store.set("MISSING_VOTES_dizum", Timestamp::from(1_700_000_000));
    store.set("EXTRA_AUTHORITIES_impostor", Timestamp::from(1_700_003_600));
    store.persist().await.expect("Persists");
    store.set("MISSING_VOTES_dizum", Timestamp::from(1_700_007_200));
    store.persist().await.expect("Persists");

    let reopened = FileSuppressionStore::open(&path).await.expect("Opens");
    assert_eq!(
        reopened.get("MISSING_VOTES_dizum"),
        Some(Timestamp::from(1_700_007_200))
    );
    assert_eq!(
        reopened.get("EXTRA_AUTHORITIES_impostor"),
        Some(Timestamp::from(1_700_003_600))
    );

    // Only the state file is left behind
    let files: Vec<_> = std::fs::read_dir(path.parent().expect("Has parent"))
        .expect("Reads dir")
        .collect();
    assert_eq!(files.len(), 1);
}

#[test_log::test(tokio::test)]
async fn corrupted_file_is_an_error() {
    let dir = tempfile::tempdir().expect("Tempdir");
    let path = dir.path().join("state.json");
    std::fs::write(&path, b"{ not json").expect("Writes");

    assert!(matches!(
        FileSuppressionStore::open(&path).await,
        Err(StoreError::Decode { .. })
    ));
}

#[test_log::test(tokio::test)]
async fn memory_store() {
    let mut store = MemorySuppressionStore::new();
    assert!(store.is_empty());
    store.set("a", Timestamp::from(1));
    store.set("a", Timestamp::from(2));
    store.persist().await.expect("Persists");
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("a"), Some(Timestamp::from(2)));
}
