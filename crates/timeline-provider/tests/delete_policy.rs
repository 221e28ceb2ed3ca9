use timeline_provider::{DataProvider, LocalDataProvider, ProviderError};
use timeline_store::RecordStore;

/// Equipment and batch deletion is disabled by explicit product policy: the
/// calls must fail with a distinct error for *any* id, existing or not, and
/// must leave nothing mutated.
#[tokio::test]
async fn equipment_delete_always_rejects() {
    let provider = LocalDataProvider::new(RecordStore::open_in_memory().expect("open"));
    let before = provider.get_equipment().await.expect("list");

    for id in ["1", "definitely-not-a-row"] {
        let err = provider.delete_equipment(id).await.expect_err("must fail");
        assert!(
            matches!(err, ProviderError::DeletionDisabled { .. }),
            "expected DeletionDisabled, got {err:?}"
        );
    }

    let after = provider.get_equipment().await.expect("list again");
    assert_eq!(before.len(), after.len());
}

#[tokio::test]
async fn batch_delete_always_rejects() {
    let provider = LocalDataProvider::new(RecordStore::open_in_memory().expect("open"));

    for id in ["25-HTS-30", "missing-batch"] {
        let err = provider.delete_batch(id).await.expect_err("must fail");
        assert!(matches!(err, ProviderError::DeletionDisabled { .. }));
    }
    assert_eq!(provider.get_batches().await.expect("list").len(), 2);
}

#[tokio::test]
async fn operation_delete_is_unconditional() {
    let provider = LocalDataProvider::new(RecordStore::open_in_memory().expect("open"));

    provider.delete_operation("1").await.expect("delete seeded");
    // Deleting an id that is already gone is a no-op, not an error.
    provider.delete_operation("1").await.expect("repeat delete");
}
