use aws_sdk_s3::error::DisplayErrorContext;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of one of the three storage operations.
///
/// Every variant carries the bucket and key the caller asked for, so the
/// `Display` output is enough to identify the failed call in a log line.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("couldn't get object {bucket}:{key}: {source}")]
    Retrieval {
        bucket: String,
        key: String,
        #[source]
        source: OperationFailure,
    },
    #[error("couldn't upload object {bucket}:{key}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: OperationFailure,
    },
    #[error("couldn't delete object {bucket}:{key}: {source}")]
    Deletion {
        bucket: String,
        key: String,
        #[source]
        source: OperationFailure,
    },
}

impl StorageError {
    pub fn retrieval(bucket: &str, key: &str, source: OperationFailure) -> Self {
        Self::Retrieval { bucket: bucket.to_string(), key: key.to_string(), source }
    }

    pub fn upload(bucket: &str, key: &str, source: OperationFailure) -> Self {
        Self::Upload { bucket: bucket.to_string(), key: key.to_string(), source }
    }

    pub fn deletion(bucket: &str, key: &str, source: OperationFailure) -> Self {
        Self::Deletion { bucket: bucket.to_string(), key: key.to_string(), source }
    }

    pub fn bucket(&self) -> &str {
        match self {
            Self::Retrieval { bucket, .. } | Self::Upload { bucket, .. } | Self::Deletion { bucket, .. } => bucket,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Retrieval { key, .. } | Self::Upload { key, .. } | Self::Deletion { key, .. } => key,
        }
    }

    /// The underlying cause, independent of the operation.
    pub fn failure(&self) -> &OperationFailure {
        match self {
            Self::Retrieval { source, .. } | Self::Upload { source, .. } | Self::Deletion { source, .. } => source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.failure(), OperationFailure::NotFound)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.failure(), OperationFailure::Cancelled)
    }
}

/// What went wrong underneath a [`StorageError`].
#[derive(Error, Debug)]
pub enum OperationFailure {
    #[error("object does not exist")]
    NotFound,
    #[error("operation cancelled")]
    Cancelled,
    #[error("failed to stream object body: {0}")]
    Body(#[source] BoxError),
    #[error("{message}")]
    Sdk {
        message: String,
        #[source]
        source: BoxError,
    },
}

impl OperationFailure {
    /// Wraps an SDK error, keeping its full cause chain in the message.
    /// The bare `Display` of an `SdkError` is only "service error".
    pub fn sdk<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Sdk { message: DisplayErrorContext(&err).to_string(), source: Box::new(err) }
    }

    pub fn body<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Body(err.into())
    }
}

/// Raised while building a storage client from a [`crate::types::params::StorageConfig`].
#[derive(Error, Debug, PartialEq)]
pub enum ConfigurationError {
    #[error("only one of access key and secret key was provided; set both, or neither to use the default credential chain")]
    PartialCredentials,
    #[error("no region configured and none could be resolved from the environment")]
    MissingRegion,
    #[error("invalid endpoint url {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}
