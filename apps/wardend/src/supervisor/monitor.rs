//! Output monitor: the sole reader of the server process stdout.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::events::{classify, ServerEvent};
use super::signals::MonitorSignals;

/// Reads stdout line-by-line, mirrors every line to the log, and publishes
/// the classified events. A read error or stream closure fires the kill
/// broadcast; the monitor never outlives the stream.
pub(crate) async fn run<R>(stdout: R, signals: MonitorSignals, kill: CancellationToken)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stdout).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = kill.cancelled() => return,
        };

        match line {
            Ok(Some(line)) => {
                info!("[server] {line}");
                let delivered = match classify(&line) {
                    Some(ServerEvent::Ready) => send(&signals.ready, (), &kill).await,
                    Some(ServerEvent::PlayerLoggedIn) => send(&signals.login, (), &kill).await,
                    Some(ServerEvent::PlayerDisconnected) => {
                        send(&signals.disconnect, (), &kill).await
                    }
                    Some(ServerEvent::PlayerCount(count)) => {
                        send(&signals.players, count, &kill).await
                    }
                    Some(ServerEvent::SaveCompleted) => send(&signals.backup, (), &kill).await,
                    None => true,
                };
                if !delivered {
                    return;
                }
            }
            Ok(None) => {
                info!("server stdout closed");
                kill.cancel();
                return;
            }
            Err(err) => {
                error!("server stdout read failed: {err}");
                kill.cancel();
                return;
            }
        }
    }
}

/// Rendezvous send that can always be abandoned by the kill broadcast.
/// Returns false once the monitor should unwind.
async fn send<T>(tx: &mpsc::Sender<T>, value: T, kill: &CancellationToken) -> bool {
    tokio::select! {
        result = tx.send(value) => result.is_ok(),
        _ = kill.cancelled() => false,
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;

    use super::*;
    use crate::supervisor::signals::Signals;

    #[tokio::test]
    async fn publishes_events_and_mirrors_noise_without_blocking() {
        let mut signals = Signals::new();
        let kill = signals.kill.clone();
        let (mut writer, reader) = tokio::io::duplex(1024);

        let task = tokio::spawn(run(reader, signals.monitor, kill.clone()));

        writer
            .write_all(b"[Server thread/INFO]: Preparing level \"world\"\n")
            .await
            .unwrap();
        writer
            .write_all(b"[Server thread/INFO]: Done (4.2s)! For help, type \"help\"\n")
            .await
            .unwrap();
        writer
            .write_all(b"[Server thread/INFO]: There are 2/20 players online:\n")
            .await
            .unwrap();

        signals.dispatcher.ready.recv().await.unwrap();
        assert_eq!(signals.watchdog.players.recv().await, Some(2));

        // Closing the stream fires the kill broadcast and ends the worker.
        drop(writer);
        task.await.unwrap();
        assert!(kill.is_cancelled());
    }

    #[tokio::test]
    async fn pending_send_is_abandoned_on_kill() {
        let signals = Signals::new();
        let kill = signals.kill.clone();
        let (mut writer, reader) = tokio::io::duplex(1024);

        // Nobody ever receives the ready signal, so the second send parks.
        let task = tokio::spawn(run(reader, signals.monitor, kill.clone()));
        writer
            .write_all(b"[Server thread/INFO]: Done (4.2s)!\n")
            .await
            .unwrap();
        writer
            .write_all(b"[Server thread/INFO]: Done (4.2s)!\n")
            .await
            .unwrap();

        kill.cancel();
        task.await.unwrap();
    }
}
