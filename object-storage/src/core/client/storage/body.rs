use std::fmt;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::OperationFailure;

/// Contents handed to [`super::StorageClient::upload`].
///
/// File bodies are streamed from disk by the S3 client. Reader bodies have no
/// known length, and PutObject requires one, so they are read to the end
/// before the request is sent.
pub struct ObjectBody {
    inner: BodyInner,
}

enum BodyInner {
    Bytes(Bytes),
    File(PathBuf),
    Reader(Pin<Box<dyn AsyncRead + Send>>),
}

impl ObjectBody {
    pub fn empty() -> Self {
        Self { inner: BodyInner::Bytes(Bytes::new()) }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { inner: BodyInner::File(path.into()) }
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self { inner: BodyInner::Reader(Box::pin(reader)) }
    }

    /// Size of the body when it is known without reading it.
    pub fn known_len(&self) -> Option<u64> {
        match &self.inner {
            BodyInner::Bytes(bytes) => Some(bytes.len() as u64),
            BodyInner::File(_) | BodyInner::Reader(_) => None,
        }
    }

    /// Reads the whole body into memory.
    pub async fn into_bytes(self) -> std::io::Result<Bytes> {
        match self.inner {
            BodyInner::Bytes(bytes) => Ok(bytes),
            BodyInner::File(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
            BodyInner::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await?;
                Ok(Bytes::from(buf))
            }
        }
    }

    pub(crate) async fn into_byte_stream(self) -> Result<ByteStream, OperationFailure> {
        match self.inner {
            BodyInner::Bytes(bytes) => Ok(ByteStream::from(bytes)),
            BodyInner::File(path) => ByteStream::from_path(path).await.map_err(OperationFailure::body),
            reader @ BodyInner::Reader(_) => {
                let bytes = Self { inner: reader }.into_bytes().await.map_err(OperationFailure::body)?;
                Ok(ByteStream::from(bytes))
            }
        }
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        match &self.inner {
            BodyInner::File(path) => Some(path.as_path()),
            _ => None,
        }
    }
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            BodyInner::Bytes(bytes) => f.debug_tuple("ObjectBody::Bytes").field(&bytes.len()).finish(),
            BodyInner::File(path) => f.debug_tuple("ObjectBody::File").field(path).finish(),
            BodyInner::Reader(_) => f.write_str("ObjectBody::Reader"),
        }
    }
}

impl Default for ObjectBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for ObjectBody {
    fn from(bytes: Bytes) -> Self {
        Self { inner: BodyInner::Bytes(bytes) }
    }
}

impl From<Vec<u8>> for ObjectBody {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for ObjectBody {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for ObjectBody {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}

impl From<&'static [u8]> for ObjectBody {
    fn from(bytes: &'static [u8]) -> Self {
        Bytes::from_static(bytes).into()
    }
}
