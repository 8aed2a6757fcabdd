use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::core::client::storage::{until_cancelled, ObjectBody, OperationFailure, StorageClient, StorageError};

type ObjectMap = HashMap<(String, String), Bytes>;

/// Process-local [`StorageClient`] keeping every object in a map.
///
/// Behaves like the S3 client as far as callers can observe: missing objects
/// fail downloads with [`OperationFailure::NotFound`], deletes are idempotent
/// and uploads overwrite. Buckets need not be created first.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStorage {
    objects: Arc<RwLock<ObjectMap>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.read().contains_key(&(bucket.to_string(), key.to_string()))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ObjectMap> {
        // a panic while holding the lock leaves the map itself consistent
        self.objects.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ObjectMap> {
        self.objects.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StorageClient for InMemoryStorage {
    async fn download(&self, cancel: &CancellationToken, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let lookup = async { self.read().get(&(bucket.to_string(), key.to_string())).cloned().ok_or(OperationFailure::NotFound) };
        let data = until_cancelled(cancel, lookup).await.map_err(|e| StorageError::retrieval(bucket, key, e))?;
        tracing::debug!(log_type = "StorageClient", category = "memory_call", data_bytes = data.len(), bucket, key, "Read object");
        Ok(data)
    }

    async fn upload(
        &self,
        cancel: &CancellationToken,
        bucket: &str,
        key: &str,
        body: ObjectBody,
    ) -> Result<(), StorageError> {
        let read_body = async { body.into_bytes().await.map_err(OperationFailure::body) };
        let data = until_cancelled(cancel, read_body).await.map_err(|e| StorageError::upload(bucket, key, e))?;
        tracing::debug!(log_type = "StorageClient", category = "memory_call", data_bytes = data.len(), bucket, key, "Wrote object");
        self.write().insert((bucket.to_string(), key.to_string()), data);
        Ok(())
    }

    async fn delete(&self, cancel: &CancellationToken, bucket: &str, key: &str) -> Result<(), StorageError> {
        if cancel.is_cancelled() {
            return Err(StorageError::deletion(bucket, key, OperationFailure::Cancelled));
        }
        let existed = self.write().remove(&(bucket.to_string(), key.to_string())).is_some();
        tracing::debug!(log_type = "StorageClient", category = "memory_call", bucket, key, existed, "Deleted object");
        Ok(())
    }
}
