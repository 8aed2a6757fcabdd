// Client abstractions module - contains the storage interface and its implementors

pub mod storage;

// Re-export commonly used types
pub use storage::memory::InMemoryStorage;
pub use storage::s3::S3Storage;
pub use storage::{ConfigurationError, ObjectBody, OperationFailure, StorageClient, StorageError};
