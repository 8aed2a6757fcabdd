use clap::Args;

use crate::types::params::StorageConfig;

/// Parameters used to config AWS S3 access.
///
/// Leave both keys unset to use the SDK's default credential chain.
#[derive(Debug, Clone, Default, Args)]
pub struct AWSConfigCliArgs {
    /// The access key ID.
    #[arg(env = "AWS_ACCESS_KEY_ID", long, hide_env_values = true)]
    pub aws_access_key_id: Option<String>,

    /// The secret access key.
    #[arg(env = "AWS_SECRET_ACCESS_KEY", long, hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,

    /// The region. Falls back to the active AWS profile when unset.
    #[arg(env = "AWS_REGION", long)]
    pub aws_region: Option<String>,

    /// Custom endpoint, for S3-compatible services.
    #[arg(env = "AWS_ENDPOINT_URL", long)]
    pub aws_endpoint_url: Option<String>,

    /// Use path-style bucket addressing.
    #[arg(env = "AWS_S3_FORCE_PATH_STYLE", long)]
    pub aws_force_path_style: bool,
}

impl From<AWSConfigCliArgs> for StorageConfig {
    fn from(args: AWSConfigCliArgs) -> Self {
        Self {
            region: args.aws_region.unwrap_or_default(),
            access_key: args.aws_access_key_id.unwrap_or_default(),
            secret_key: args.aws_secret_access_key.unwrap_or_default(),
            endpoint_url: args.aws_endpoint_url,
            force_path_style: args.aws_force_path_style,
        }
    }
}
