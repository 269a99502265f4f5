//! Input dispatcher: the sole writer to the server process stdin.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::error;

use super::signals::DispatcherSignals;

const SAVE_OFF_COMMAND: &[u8] = b"save-off\n";
const SAVE_ALL_COMMAND: &[u8] = b"save-all\n";
const LIST_COMMAND: &[u8] = b"/list\n";
const STOP_COMMAND: &[u8] = b"/stop\n";

/// Waits on the outbound-command signals and writes the matching command
/// line, one complete line at a time in arrival order. Commands never
/// interleave because nothing else holds the stdin handle. Exits on kill;
/// a write error fires the kill broadcast.
pub(crate) async fn run<W>(mut stdin: W, mut signals: DispatcherSignals, kill: CancellationToken)
where
    W: AsyncWrite + Unpin,
{
    loop {
        let command = tokio::select! {
            Some(()) = signals.ready.recv() => SAVE_OFF_COMMAND,
            Some(()) = signals.save.recv() => SAVE_ALL_COMMAND,
            Some(()) = signals.check_players.recv() => LIST_COMMAND,
            Some(()) = signals.stop.recv() => STOP_COMMAND,
            _ = kill.cancelled() => return,
        };

        if let Err(err) = write_command(&mut stdin, command).await {
            error!("server stdin write failed: {err}");
            kill.cancel();
            return;
        }
    }
}

async fn write_command<W: AsyncWrite + Unpin>(stdin: &mut W, command: &[u8]) -> io::Result<()> {
    stdin.write_all(command).await?;
    stdin.flush().await
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;
    use crate::supervisor::signals::Signals;

    #[tokio::test]
    async fn concurrent_triggers_never_interleave_command_text() {
        let signals = Signals::new();
        let kill = signals.kill.clone();
        let (mut reader, writer) = tokio::io::duplex(1024);

        let task = tokio::spawn(run(writer, signals.dispatcher, kill.clone()));

        let monitor = signals.monitor;
        let watchdog = signals.watchdog;
        let scheduler = signals.scheduler;

        // All four triggers land at once; the dispatcher drains them one
        // complete command line at a time.
        monitor.ready.send(()).await.unwrap();
        scheduler.save.send(()).await.unwrap();
        watchdog.check_players.send(()).await.unwrap();
        watchdog.stop.send(()).await.unwrap();

        let expected = ["save-off", "save-all", "/list", "/stop"];
        let total: usize = expected.iter().map(|cmd| cmd.len() + 1).sum();
        let mut buf = vec![0u8; total];
        reader.read_exact(&mut buf).await.unwrap();

        let output = String::from_utf8(buf).unwrap();
        let mut written: Vec<&str> = output.lines().collect();
        written.sort_unstable();
        let mut wanted = expected.to_vec();
        wanted.sort_unstable();
        assert_eq!(written, wanted);

        kill.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn exits_once_the_kill_broadcast_fires() {
        let signals = Signals::new();
        let kill = signals.kill.clone();
        let (_reader, writer) = tokio::io::duplex(64);

        let task = tokio::spawn(run(writer, signals.dispatcher, kill.clone()));
        kill.cancel();
        task.await.unwrap();
    }
}
