pub mod body;
pub mod error;
pub mod memory;
pub mod s3;

use std::future::Future;

use async_trait::async_trait;
use bytes::Bytes;
pub use body::ObjectBody;
pub use error::{ConfigurationError, OperationFailure, StorageError};
use tokio_util::sync::CancellationToken;

/// Trait defining object storage operations.
///
/// Each call is one request against the backing store. Calls carry no
/// ordering between each other: two concurrent uploads to the same key race
/// and whichever the store sees last wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Fetch the whole object at `bucket`/`key` into memory.
    async fn download(&self, cancel: &CancellationToken, bucket: &str, key: &str) -> Result<Bytes, StorageError>;

    /// Write `body` as the contents of `bucket`/`key`, replacing any existing object.
    async fn upload(
        &self,
        cancel: &CancellationToken,
        bucket: &str,
        key: &str,
        body: ObjectBody,
    ) -> Result<(), StorageError>;

    /// Remove `bucket`/`key`. Removing an object that does not exist succeeds.
    async fn delete(&self, cancel: &CancellationToken, bucket: &str, key: &str) -> Result<(), StorageError>;
}

/// Drives `operation` until it finishes or `cancel` fires, whichever comes first.
/// A token that is already cancelled wins over a ready operation.
pub(crate) async fn until_cancelled<T, F>(cancel: &CancellationToken, operation: F) -> Result<T, OperationFailure>
where
    F: Future<Output = Result<T, OperationFailure>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(OperationFailure::Cancelled),
        result = operation => result,
    }
}
