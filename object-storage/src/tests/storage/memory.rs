use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use bytes::Bytes;
use rstest::rstest;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::core::client::{InMemoryStorage, ObjectBody, OperationFailure, StorageClient, StorageError};
use crate::tests::common::{cancel, memory_storage, TEST_BUCKET, TEST_KEY};
use crate::tests::storage::assert_round_trip;

#[rstest]
#[case::text(Bytes::from_static(b"hello world. hello world."))]
#[case::empty(Bytes::new())]
#[case::binary(Bytes::from((0..=255u8).cycle().take(64 * 1024).collect::<Vec<u8>>()))]
#[tokio::test]
async fn upload_then_download_returns_content(memory_storage: InMemoryStorage, #[case] content: Bytes) {
    assert_round_trip(&memory_storage, TEST_BUCKET, TEST_KEY, content).await;
}

#[rstest]
#[tokio::test]
async fn upload_overwrites_existing_object(memory_storage: InMemoryStorage, cancel: CancellationToken) {
    memory_storage.upload(&cancel, TEST_BUCKET, TEST_KEY, "first version".into()).await.unwrap();
    memory_storage.upload(&cancel, TEST_BUCKET, TEST_KEY, "second".into()).await.unwrap();

    let data = memory_storage.download(&cancel, TEST_BUCKET, TEST_KEY).await.unwrap();
    assert_eq!(data, Bytes::from_static(b"second"));
    assert_eq!(memory_storage.len(), 1);
}

#[rstest]
#[tokio::test]
async fn download_missing_object_is_retrieval_not_found(memory_storage: InMemoryStorage, cancel: CancellationToken) {
    let err = memory_storage.download(&cancel, TEST_BUCKET, "missing.txt").await.unwrap_err();

    assert_matches!(&err, StorageError::Retrieval { bucket, key, source: OperationFailure::NotFound }
        if bucket == TEST_BUCKET && key == "missing.txt");
    assert!(err.is_not_found());
    let message = err.to_string();
    assert!(message.contains(TEST_BUCKET) && message.contains("missing.txt"), "{message}");
}

#[rstest]
#[tokio::test]
async fn objects_are_scoped_by_bucket(memory_storage: InMemoryStorage, cancel: CancellationToken) {
    memory_storage.upload(&cancel, "bucket-a", TEST_KEY, "a".into()).await.unwrap();

    assert!(memory_storage.contains("bucket-a", TEST_KEY));
    assert!(!memory_storage.contains("bucket-b", TEST_KEY));
    assert!(memory_storage.download(&cancel, "bucket-b", TEST_KEY).await.unwrap_err().is_not_found());
}

#[rstest]
#[tokio::test]
async fn delete_is_idempotent(memory_storage: InMemoryStorage, cancel: CancellationToken) {
    memory_storage.upload(&cancel, TEST_BUCKET, TEST_KEY, "data".into()).await.unwrap();

    memory_storage.delete(&cancel, TEST_BUCKET, TEST_KEY).await.unwrap();
    memory_storage.delete(&cancel, TEST_BUCKET, TEST_KEY).await.unwrap();
    memory_storage.delete(&cancel, TEST_BUCKET, "never-existed").await.unwrap();

    assert!(memory_storage.is_empty());
    assert!(memory_storage.download(&cancel, TEST_BUCKET, TEST_KEY).await.unwrap_err().is_not_found());
}

#[rstest]
#[tokio::test]
async fn cancelled_token_fails_every_operation(memory_storage: InMemoryStorage) {
    let cancel = CancellationToken::new();
    memory_storage.upload(&CancellationToken::new(), TEST_BUCKET, TEST_KEY, "data".into()).await.unwrap();
    cancel.cancel();

    let download = memory_storage.download(&cancel, TEST_BUCKET, TEST_KEY).await.unwrap_err();
    assert_matches!(download, StorageError::Retrieval { source: OperationFailure::Cancelled, .. });

    let upload = memory_storage.upload(&cancel, TEST_BUCKET, "other", "x".into()).await.unwrap_err();
    assert_matches!(upload, StorageError::Upload { source: OperationFailure::Cancelled, .. });
    assert!(!memory_storage.contains(TEST_BUCKET, "other"));

    let delete = memory_storage.delete(&cancel, TEST_BUCKET, TEST_KEY).await.unwrap_err();
    assert!(delete.is_cancelled());
    assert!(memory_storage.contains(TEST_BUCKET, TEST_KEY));
}

#[rstest]
#[tokio::test]
async fn cancellation_interrupts_stalled_upload(memory_storage: InMemoryStorage, cancel: CancellationToken) {
    // the writer half stays open and silent, so the body never ends
    let (_writer, reader) = tokio::io::duplex(64);

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        memory_storage.upload(&cancel, TEST_BUCKET, TEST_KEY, ObjectBody::from_reader(reader)),
    )
    .await
    .expect("upload did not return after cancellation");

    assert!(result.unwrap_err().is_cancelled());
    assert!(memory_storage.is_empty());
}

#[rstest]
#[tokio::test]
async fn upload_from_reader_stores_everything(memory_storage: InMemoryStorage, cancel: CancellationToken) {
    let (mut writer, reader) = tokio::io::duplex(16);
    tokio::spawn(async move {
        for chunk in ["streamed ", "in ", "several ", "chunks"] {
            writer.write_all(chunk.as_bytes()).await.unwrap();
        }
    });

    memory_storage.upload(&cancel, TEST_BUCKET, TEST_KEY, ObjectBody::from_reader(reader)).await.unwrap();

    let data = memory_storage.download(&cancel, TEST_BUCKET, TEST_KEY).await.unwrap();
    assert_eq!(data, Bytes::from_static(b"streamed in several chunks"));
}

#[rstest]
#[tokio::test]
async fn concurrent_downloads_return_full_content(memory_storage: InMemoryStorage, cancel: CancellationToken) {
    let content = Bytes::from(vec![7u8; 256 * 1024]);
    memory_storage.upload(&cancel, TEST_BUCKET, TEST_KEY, content.clone().into()).await.unwrap();

    let storage: Arc<dyn StorageClient> = Arc::new(memory_storage);
    let downloads = (0..16).map(|_| {
        let storage = Arc::clone(&storage);
        let cancel = cancel.clone();
        tokio::spawn(async move { storage.download(&cancel, TEST_BUCKET, TEST_KEY).await })
    });

    for result in futures::future::join_all(downloads).await {
        assert_eq!(result.unwrap().unwrap(), content);
    }
}

#[rstest]
#[tokio::test]
async fn clones_share_the_same_objects(memory_storage: InMemoryStorage, cancel: CancellationToken) {
    let other = memory_storage.clone();
    memory_storage.upload(&cancel, TEST_BUCKET, TEST_KEY, "shared".into()).await.unwrap();

    assert_eq!(other.download(&cancel, TEST_BUCKET, TEST_KEY).await.unwrap(), Bytes::from_static(b"shared"));
}
