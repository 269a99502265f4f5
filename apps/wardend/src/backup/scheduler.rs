//! Backup scheduler: periodic save requests, backup on save confirmation,
//! and the final backup at shutdown.

use std::path::PathBuf;
use std::time::Duration;

use backup_store::ObjectStore;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::retry;
use crate::supervisor::signals::SchedulerSignals;

/// Every autosave tick asks the dispatcher for a `save-all`; every save the
/// server confirms triggers an upload cycle. The kill broadcast triggers one
/// last cycle *after* being observed, since the world on disk outlives the
/// process and must still be archived; only then does the worker exit.
pub(crate) async fn run<S: ObjectStore>(
    store: S,
    dir: PathBuf,
    save_interval: Duration,
    max_attempts: u32,
    mut signals: SchedulerSignals,
    kill: CancellationToken,
) {
    let mut autosave = tokio::time::interval(save_interval);
    autosave.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately; the autosave
    // cadence starts one period after boot.
    autosave.tick().await;

    loop {
        tokio::select! {
            _ = autosave.tick() => {
                tokio::select! {
                    result = signals.save.send(()) => {
                        if result.is_err() {
                            continue;
                        }
                    }
                    _ = kill.cancelled() => continue,
                }
            }
            Some(()) = signals.backup.recv() => {
                retry::create_backup(&store, &dir, max_attempts).await;
            }
            _ = kill.cancelled() => {
                retry::create_backup(&store, &dir, max_attempts).await;
                return;
            }
        }
    }
}
