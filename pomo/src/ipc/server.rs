//! Unix domain socket server for IPC

use crate::commands;
use crate::daemon::SharedState;
use anyhow::{bail, Context, Result};
use pomo_ipc::{Command, MAX_COMMAND_BYTES};
use std::os::unix::fs::FileTypeExt;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tracing::{error, info, warn};

pub fn bind(socket_path: &Path) -> Result<UnixListener> {
    remove_stale_socket(socket_path)?;

    let listener = UnixListener::bind(socket_path)
        .with_context(|| format!("Failed to bind control socket at {:?}", socket_path))?;
    info!("IPC server listening on {:?}", socket_path);
    Ok(listener)
}

/// Remove a socket left behind by an earlier run. Anything that is not a
/// socket is left alone, and the bind below fails on it.
fn remove_stale_socket(socket_path: &Path) -> Result<()> {
    match std::fs::symlink_metadata(socket_path) {
        Ok(meta) if meta.file_type().is_socket() => {
            std::fs::remove_file(socket_path).with_context(|| {
                format!("Failed to remove stale socket at {:?}", socket_path)
            })?;
            info!("Removed stale socket at {:?}", socket_path);
        }
        Ok(_) => bail!("{:?} exists and is not a socket", socket_path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to inspect {:?}", socket_path));
        }
    }
    Ok(())
}

/// Accept connections one at a time. Further clients wait in the
/// listen backlog until the current one is answered.
pub async fn serve(listener: UnixListener, state: SharedState) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                if let Err(e) = handle_client(stream, &state).await {
                    error!("Error handling client: {}", e);
                }
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

async fn handle_client(mut stream: UnixStream, state: &SharedState) -> Result<()> {
    let mut buf = vec![0; MAX_COMMAND_BYTES];
    let n = stream.read(&mut buf).await?;
    let decoded = String::from_utf8_lossy(&buf[..n]);
    let text = decoded.trim();
    info!("Received: {}", text);

    let response = {
        let mut state = state.lock().await;
        commands::execute(&mut state, Command::parse(text))
    };

    if !response.is_empty() {
        match respond(&mut stream, &response).await {
            Ok(()) => info!("Responded: {}", response),
            Err(e) => warn!("Client broke connection: {}", e),
        }
    }

    info!("Request handled.");
    Ok(())
}

async fn respond(stream: &mut UnixStream, response: &str) -> std::io::Result<()> {
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await
}
