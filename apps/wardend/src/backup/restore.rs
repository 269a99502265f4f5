//! Restore-on-startup: pull the last snapshot before the server launches.

use std::path::Path;

use anyhow::{Context, Result};
use backup_store::ObjectStore;
use tracing::info;

/// Fetches the world archive and unpacks it into the server directory. A
/// missing object means a first run and is skipped; anything else is fatal,
/// since the server must never start over a half-restored world.
pub(crate) async fn restore<S: ObjectStore>(store: &S, dir: &Path) -> Result<()> {
    let archive = store
        .fetch_archive()
        .await
        .context("failed to fetch the world archive")?;

    let Some(archive) = archive else {
        info!("no backup found, starting a fresh world");
        return Ok(());
    };

    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || world_archive::unpack(&archive, &dir))
        .await
        .context("restore task panicked")?
        .context("failed to unpack the world archive")?;

    info!("restored world files");
    Ok(())
}
