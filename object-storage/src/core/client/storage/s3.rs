use std::sync::Arc;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::core::client::storage::{
    until_cancelled, ConfigurationError, ObjectBody, OperationFailure, StorageClient, StorageError,
};
use crate::types::params::{CredentialSource, StorageConfig};

/// S3 backed implementation of [`StorageClient`].
///
/// Cloning is cheap; clones share the same SDK client and connection pool.
#[derive(Clone, Debug)]
pub struct S3Storage {
    pub(crate) client: Arc<Client>,
    config: Arc<StorageConfig>,
}

impl S3Storage {
    /// Creates a new S3 storage client from the provided configuration.
    ///
    /// # Arguments
    /// * `config` - Region, credentials and optional endpoint override.
    ///
    /// # Returns
    /// * `Result<Self, ConfigurationError>` - Fails when only one credential key is set,
    ///   the endpoint is not an http(s) url, or no region can be resolved.
    pub async fn new(config: StorageConfig) -> Result<Self, ConfigurationError> {
        let credential_source = config.credential_source()?;
        config.validated_endpoint()?;

        let region_provider = match config.explicit_region() {
            Some(region) => RegionProviderChain::first_try(Region::new(region.to_string())).or_default_provider(),
            None => RegionProviderChain::default_provider(),
        };

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
        if let CredentialSource::Static { access_key, secret_key } = &credential_source {
            loader = loader.credentials_provider(Credentials::from_keys(access_key, secret_key, None));
        }
        let sdk_config = loader.load().await;
        let region = sdk_config.region().cloned().ok_or(ConfigurationError::MissingRegion)?;

        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            s3_config_builder.set_endpoint_url(Some(endpoint.clone()));
        }
        // path style is what MinIO and LocalStack expect
        s3_config_builder.set_force_path_style(Some(config.force_path_style));
        let client = Client::from_conf(s3_config_builder.build());

        tracing::info!(
            log_type = "StorageClient",
            category = "storage_setup",
            region = %region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            ambient_credentials = matches!(credential_source, CredentialSource::Ambient),
            "S3 storage client initialised"
        );

        Ok(Self { client: Arc::new(client), config: Arc::new(config) })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

#[async_trait]
impl StorageClient for S3Storage {
    /// Get the object stored at `bucket`/`key`.
    ///
    /// # Returns
    /// * `Result<Bytes, StorageError>` - The whole body, or a `Retrieval` error.
    ///   A missing object is reported as [`OperationFailure::NotFound`].
    async fn download(&self, cancel: &CancellationToken, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let fetch = async {
            let output =
                self.client.get_object().bucket(bucket).key(key).send().await.map_err(classify_get_object_error)?;
            // The body is dropped on every exit from this block, releasing the connection.
            let data = output.body.collect().await.map_err(OperationFailure::body)?;
            Ok::<_, OperationFailure>(data.into_bytes())
        };

        match until_cancelled(cancel, fetch).await {
            Ok(data) => {
                tracing::debug!(
                    log_type = "StorageClient",
                    category = "storage_call",
                    data_bytes = data.len(),
                    "Successfully retrieved data from {}, key={}",
                    bucket,
                    key
                );
                Ok(data)
            }
            Err(failure) => {
                log_failure("download", bucket, key, &failure);
                Err(StorageError::retrieval(bucket, key, failure))
            }
        }
    }

    /// Put `body` into the bucket under `key`, overwriting what was there.
    async fn upload(
        &self,
        cancel: &CancellationToken,
        bucket: &str,
        key: &str,
        body: ObjectBody,
    ) -> Result<(), StorageError> {
        if let Some(path) = body.path() {
            tracing::debug!(bucket, key, path = %path.display(), "Streaming upload from file");
        }
        let put = async {
            let stream = body.into_byte_stream().await?;
            self.client.put_object().bucket(bucket).key(key).body(stream).send().await.map_err(OperationFailure::sdk)?;
            Ok::<_, OperationFailure>(())
        };

        match until_cancelled(cancel, put).await {
            Ok(()) => {
                tracing::debug!(
                    log_type = "StorageClient",
                    category = "storage_call",
                    "Successfully put data into {}. key={}",
                    bucket,
                    key
                );
                Ok(())
            }
            Err(failure) => {
                log_failure("upload", bucket, key, &failure);
                Err(StorageError::upload(bucket, key, failure))
            }
        }
    }

    /// Delete the object at `bucket`/`key`. A 404 for a missing key counts as success;
    /// a 404 for a missing bucket does not.
    async fn delete(&self, cancel: &CancellationToken, bucket: &str, key: &str) -> Result<(), StorageError> {
        let remove = async {
            match self.client.delete_object().bucket(bucket).key(key).send().await {
                Ok(_) => Ok(()),
                Err(err) if object_missing(&err) => {
                    tracing::debug!(bucket, key, "Object already absent");
                    Ok(())
                }
                Err(err) => Err(OperationFailure::sdk(err)),
            }
        };

        match until_cancelled(cancel, remove).await {
            Ok(()) => {
                tracing::debug!(
                    log_type = "StorageClient",
                    category = "storage_call",
                    "Successfully deleted {}. key={}",
                    bucket,
                    key
                );
                Ok(())
            }
            Err(failure) => {
                log_failure("delete", bucket, key, &failure);
                Err(StorageError::deletion(bucket, key, failure))
            }
        }
    }
}

fn classify_get_object_error(err: SdkError<GetObjectError>) -> OperationFailure {
    let missing = match &err {
        SdkError::ServiceError(service) => service.err().is_no_such_key(),
        _ => false,
    };
    if missing || object_missing(&err) {
        OperationFailure::NotFound
    } else {
        OperationFailure::sdk(err)
    }
}

/// A 404 naming the key, or carrying no error code at all. Other coded 404s
/// such as `NoSuchBucket` are real failures.
fn object_missing<E: ProvideErrorMetadata>(err: &SdkError<E>) -> bool {
    match err {
        SdkError::ServiceError(service) => {
            service.raw().status().as_u16() == 404
                && matches!(service.err().code(), None | Some("NoSuchKey") | Some("NotFound"))
        }
        _ => false,
    }
}

fn log_failure(operation: &'static str, bucket: &str, key: &str, failure: &OperationFailure) {
    match failure {
        OperationFailure::NotFound | OperationFailure::Cancelled => {
            tracing::debug!(log_type = "StorageClient", operation, bucket, key, reason = %failure, "S3 call did not complete")
        }
        _ => tracing::error!(
            log_type = "StorageClient",
            category = "storage_call",
            operation,
            bucket,
            key,
            error = %failure,
            "S3 call failed"
        ),
    }
}
