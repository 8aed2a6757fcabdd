use clap::Parser as _;
use dotenvy::dotenv;
use object_storage::cli::command::execute;
use object_storage::cli::Cli;
use object_storage::utils::logging::init_logging;
use object_storage::{S3Storage, StorageConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let object = cli.command.object();
    let span = tracing::info_span!("objstore", command = cli.command.name(), bucket = %object.bucket, key = %object.key);

    let config = StorageConfig::from(cli.aws_config_args.clone());
    let storage = S3Storage::new(config).instrument(span.clone()).await?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            on_ctrl_c.cancel();
        }
    });

    let mut stdout = tokio::io::stdout();
    if let Err(e) = execute(&storage, &cancel, &cli.command, tokio::io::stdin(), &mut stdout).instrument(span).await {
        error!(error = %e, error_chain = ?e, "Command {} failed", cli.command.name());
        std::process::exit(1);
    }
    Ok(())
}
