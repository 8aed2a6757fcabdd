//! Download, upload and delete objects in S3-compatible object storage.
//!
//! [`core::client::StorageClient`] is the capability interface. [`core::client::S3Storage`]
//! is the production implementation on top of `aws-sdk-s3`; [`core::client::InMemoryStorage`]
//! stands in for it in tests and local tooling.

pub mod cli;
pub mod core;
pub mod types;
pub mod utils;

#[cfg(test)]
pub mod tests;

// Re-export commonly used items
pub use crate::core::client::{
    ConfigurationError, InMemoryStorage, ObjectBody, OperationFailure, S3Storage, StorageClient, StorageError,
};
pub use crate::types::params::{CredentialSource, StorageConfig};
