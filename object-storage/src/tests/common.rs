use httpmock::MockServer;
use rstest::fixture;
use tokio_util::sync::CancellationToken;

use crate::core::client::{InMemoryStorage, S3Storage};
use crate::types::params::StorageConfig;

pub const TEST_BUCKET: &str = "test-bucket";
pub const TEST_KEY: &str = "test_data.txt";

#[fixture]
pub fn cancel() -> CancellationToken {
    CancellationToken::new()
}

#[fixture]
pub fn memory_storage() -> InMemoryStorage {
    InMemoryStorage::new()
}

pub fn object_path(bucket: &str, key: &str) -> String {
    format!("/{}/{}", bucket, key)
}

/// An S3 client pointed at `server` with static test credentials.
pub async fn s3_storage_for(server: &MockServer) -> S3Storage {
    let config = StorageConfig::new("us-east-1", "mock_key", "mock_secret")
        .with_endpoint(server.base_url())
        .with_force_path_style(true);
    S3Storage::new(config).await.expect("Failed to build S3 storage for the mock server")
}
