use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::core::client::storage::ConfigurationError;

/// Settings needed to build an [`crate::core::client::S3Storage`].
///
/// Credentials and region may be left empty to defer to the SDK's default
/// provider chains:
/// - both keys empty: credentials come from the environment
///   (`AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY`, shared profile files,
///   container or instance metadata);
/// - region empty: the region comes from `AWS_REGION` or the active profile.
///
/// Setting only one of the two keys is rejected.
#[derive(Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Custom endpoint for S3-compatible services such as MinIO or LocalStack.
    pub endpoint_url: Option<String>,
    /// Address buckets as `endpoint/bucket/key` instead of `bucket.endpoint/key`.
    pub force_path_style: bool,
}

/// Where the client gets its credentials from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Static { access_key: String, secret_key: String },
    Ambient,
}

impl StorageConfig {
    pub fn new(region: impl Into<String>, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            endpoint_url: None,
            force_path_style: false,
        }
    }

    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    pub fn credential_source(&self) -> Result<CredentialSource, ConfigurationError> {
        match (self.access_key.is_empty(), self.secret_key.is_empty()) {
            (false, false) => Ok(CredentialSource::Static {
                access_key: self.access_key.clone(),
                secret_key: self.secret_key.clone(),
            }),
            (true, true) => Ok(CredentialSource::Ambient),
            _ => Err(ConfigurationError::PartialCredentials),
        }
    }

    /// The explicit region, if one was configured.
    pub fn explicit_region(&self) -> Option<&str> {
        let region = self.region.trim();
        (!region.is_empty()).then_some(region)
    }

    pub fn validated_endpoint(&self) -> Result<Option<Url>, ConfigurationError> {
        let Some(endpoint) = &self.endpoint_url else {
            return Ok(None);
        };
        let url = Url::parse(endpoint).map_err(|e| ConfigurationError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(Some(url)),
            scheme => Err(ConfigurationError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                reason: format!("unsupported scheme {scheme}"),
            }),
        }
    }

    /// Checks everything that can be checked without touching the environment.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.credential_source()?;
        self.validated_endpoint()?;
        Ok(())
    }
}

// The secret key never reaches logs.
impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &if self.secret_key.is_empty() { "" } else { "***" })
            .field("endpoint_url", &self.endpoint_url)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}
