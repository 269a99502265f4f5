//! The bounded backup cycle: build the archive, upload it, retry on any
//! failure up to a fixed budget. A backup that ultimately fails is logged
//! and dropped; it must never take the supervisor down with it.

use std::path::Path;

use anyhow::Context;
use backup_store::ObjectStore;
use tracing::{error, info, warn};

pub(crate) async fn create_backup<S: ObjectStore>(store: &S, dir: &Path, max_attempts: u32) {
    for _ in 0..max_attempts {
        match try_backup(store, dir).await {
            Ok(()) => {
                info!("created backup");
                return;
            }
            Err(err) => warn!("backup attempt failed, trying again: {err:#}"),
        }
    }
    error!("could not create backup after {max_attempts} attempts");
}

/// One attempt. A build failure short-circuits before any store call, so a
/// partial archive is never uploaded.
async fn try_backup<S: ObjectStore>(store: &S, dir: &Path) -> anyhow::Result<()> {
    let dir = dir.to_path_buf();
    let archive = tokio::task::spawn_blocking(move || world_archive::build(&dir))
        .await
        .context("archive build task panicked")?
        .context("failed to build world archive")?;

    store
        .put_archive(archive)
        .await
        .context("failed to upload world archive")?;
    Ok(())
}
