use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use provider::aws::AWSConfigCliArgs;

pub mod command;
pub mod provider;

#[derive(Parser, Debug)]
#[command(
    name = "objstore",
    about = "Get, put and remove objects in S3-compatible storage",
    after_help = "Examples:\n  \
    objstore get --bucket my-bucket --key reports/latest.json --output latest.json\n  \
    objstore put --bucket my-bucket --key reports/latest.json --file latest.json\n  \
    cat latest.json | objstore put --bucket my-bucket --key reports/latest.json\n  \
    objstore rm --bucket my-bucket --key reports/latest.json"
)]
pub struct Cli {
    #[command(flatten)]
    pub aws_config_args: AWSConfigCliArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Download an object to a file or stdout
    Get {
        #[command(flatten)]
        object: ObjectArgs,

        /// Write the object here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Upload a file or stdin as an object
    Put {
        #[command(flatten)]
        object: ObjectArgs,

        /// Read the object from this file instead of stdin.
        #[arg(long, short)]
        file: Option<PathBuf>,
    },
    /// Delete an object
    Rm {
        #[command(flatten)]
        object: ObjectArgs,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Get { .. } => "get",
            Commands::Put { .. } => "put",
            Commands::Rm { .. } => "rm",
        }
    }

    pub fn object(&self) -> &ObjectArgs {
        match self {
            Commands::Get { object, .. } | Commands::Put { object, .. } | Commands::Rm { object } => object,
        }
    }
}

/// Identifies the remote object.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct ObjectArgs {
    /// The bucket name.
    #[arg(long, short)]
    pub bucket: String,

    /// The object key.
    #[arg(long, short)]
    pub key: String,
}
