use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::cli::Commands;
use crate::core::client::{ObjectBody, StorageClient};

/// Runs one CLI command against `storage`.
///
/// `stdin` feeds `put` when no file is given and `stdout` receives `get`
/// output when no output path is given.
pub async fn execute<R, W>(
    storage: &dyn StorageClient,
    cancel: &CancellationToken,
    command: &Commands,
    stdin: R,
    stdout: &mut W,
) -> Result<()>
where
    R: AsyncRead + Send + 'static,
    W: AsyncWrite + Unpin,
{
    match command {
        Commands::Get { object, output } => {
            let data = storage.download(cancel, &object.bucket, &object.key).await?;
            match output {
                Some(path) => tokio::fs::write(path, &data)
                    .await
                    .wrap_err_with(|| format!("Failed to write object to {}", path.display()))?,
                None => {
                    stdout.write_all(&data).await.wrap_err("Failed to write object to stdout")?;
                    stdout.flush().await?;
                }
            }
            tracing::info!(bucket = %object.bucket, key = %object.key, data_bytes = data.len(), "Object downloaded");
        }
        Commands::Put { object, file } => {
            let body = match file {
                Some(path) => {
                    // fail early with a readable message instead of an SDK stream error
                    tokio::fs::metadata(path).await.wrap_err_with(|| format!("Cannot read {}", path.display()))?;
                    ObjectBody::from_path(path)
                }
                None => ObjectBody::from_reader(stdin),
            };
            storage.upload(cancel, &object.bucket, &object.key, body).await?;
            tracing::info!(bucket = %object.bucket, key = %object.key, "Object uploaded");
        }
        Commands::Rm { object } => {
            storage.delete(cancel, &object.bucket, &object.key).await?;
            tracing::info!(bucket = %object.bucket, key = %object.key, "Object deleted");
        }
    }
    Ok(())
}
