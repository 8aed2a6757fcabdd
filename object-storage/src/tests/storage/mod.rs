pub mod memory;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::core::client::{ObjectBody, StorageClient};

/// Upload then download must hand back exactly what went in.
pub async fn assert_round_trip(storage: &dyn StorageClient, bucket: &str, key: &str, content: Bytes) {
    let cancel = CancellationToken::new();
    storage.upload(&cancel, bucket, key, ObjectBody::from(content.clone())).await.expect("Unable to put data into the bucket.");
    let data = storage.download(&cancel, bucket, key).await.expect("Unable to get the data from the bucket.");
    assert_eq!(data, content);
}
