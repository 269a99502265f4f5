//! Coordinator: owns the child process and the worker lifecycle.

use std::process::Stdio;

use anyhow::{Context, Result};
use backup_store::S3BackupStore;
use tokio::process::{Child, Command};
use tracing::{error, info};

use crate::backup;
use crate::config::Settings;

use super::signals::Signals;
use super::{dispatcher, monitor, watchdog};

/// Restores the last snapshot, spawns the server, runs the four workers,
/// and sees the shutdown protocol through: (idle decision or process exit)
/// -> kill broadcast -> final backup -> every worker joined.
pub async fn run(settings: Settings) -> Result<()> {
    let store = S3BackupStore::connect(&settings.store_settings()).await;

    backup::restore(&store, &settings.dir).await?;

    let mut child = spawn_server(&settings)?;
    let stdin = child.stdin.take().context("server stdin was not piped")?;
    let stdout = child.stdout.take().context("server stdout was not piped")?;

    let signals = Signals::new();
    let kill = signals.kill.clone();

    let workers = [
        tokio::spawn(monitor::run(stdout, signals.monitor, kill.clone())),
        tokio::spawn(dispatcher::run(stdin, signals.dispatcher, kill.clone())),
        tokio::spawn(watchdog::run(
            signals.watchdog,
            kill.clone(),
            settings.idle_interval(),
        )),
        tokio::spawn(backup::scheduler::run(
            store,
            settings.dir.clone(),
            settings.save_interval(),
            settings.max_backup_attempts,
            signals.scheduler,
            kill.clone(),
        )),
    ];

    info!("starting minecraft server");

    tokio::select! {
        status = child.wait() => match status {
            Ok(status) => info!("server exited: {status}"),
            Err(err) => error!("failed to wait on server process: {err}"),
        },
        _ = kill.cancelled() => {
            if let Err(err) = child.kill().await {
                error!("failed to kill server process: {err}");
            }
        }
    }

    // Safe even when a worker already fired it.
    kill.cancel();

    for worker in workers {
        let _ = worker.await;
    }

    Ok(())
}

fn spawn_server(settings: &Settings) -> Result<Child> {
    let (program, args) = settings.launch_command();
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(&settings.dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped());
    cmd.spawn().context("failed to launch the server process")
}
