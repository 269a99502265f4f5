//! The coordination context shared by the supervisor workers.
//!
//! Every worker communicates only through the capacity-1 channels bundled
//! here (a send parks until the receiver is waiting) plus the one-shot kill
//! token. The token is the only broadcast: cancelling it twice is harmless,
//! and every worker observes it either via a non-blocking `is_cancelled` or
//! an awaited `cancelled()`.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub(crate) struct MonitorSignals {
    pub ready: mpsc::Sender<()>,
    pub login: mpsc::Sender<()>,
    pub disconnect: mpsc::Sender<()>,
    pub players: mpsc::Sender<i32>,
    pub backup: mpsc::Sender<()>,
}

pub(crate) struct DispatcherSignals {
    pub ready: mpsc::Receiver<()>,
    pub save: mpsc::Receiver<()>,
    pub check_players: mpsc::Receiver<()>,
    pub stop: mpsc::Receiver<()>,
}

pub(crate) struct WatchdogSignals {
    pub login: mpsc::Receiver<()>,
    pub disconnect: mpsc::Receiver<()>,
    pub check_players: mpsc::Sender<()>,
    pub players: mpsc::Receiver<i32>,
    pub stop: mpsc::Sender<()>,
}

pub(crate) struct SchedulerSignals {
    pub save: mpsc::Sender<()>,
    pub backup: mpsc::Receiver<()>,
}

pub(crate) struct Signals {
    pub kill: CancellationToken,
    pub monitor: MonitorSignals,
    pub dispatcher: DispatcherSignals,
    pub watchdog: WatchdogSignals,
    pub scheduler: SchedulerSignals,
}

impl Signals {
    pub fn new() -> Self {
        let (ready_tx, ready_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let (save_tx, save_rx) = mpsc::channel(1);
        let (backup_tx, backup_rx) = mpsc::channel(1);
        let (login_tx, login_rx) = mpsc::channel(1);
        let (disconnect_tx, disconnect_rx) = mpsc::channel(1);
        let (check_players_tx, check_players_rx) = mpsc::channel(1);
        let (players_tx, players_rx) = mpsc::channel(1);

        Self {
            kill: CancellationToken::new(),
            monitor: MonitorSignals {
                ready: ready_tx,
                login: login_tx,
                disconnect: disconnect_tx,
                players: players_tx,
                backup: backup_tx,
            },
            dispatcher: DispatcherSignals {
                ready: ready_rx,
                save: save_rx,
                check_players: check_players_rx,
                stop: stop_rx,
            },
            watchdog: WatchdogSignals {
                login: login_rx,
                disconnect: disconnect_rx,
                check_players: check_players_tx,
                players: players_rx,
                stop: stop_tx,
            },
            scheduler: SchedulerSignals {
                save: save_tx,
                backup: backup_rx,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn kill_broadcast_is_idempotent() {
        let signals = Signals::new();
        let kill = signals.kill.clone();
        let waiter = signals.kill.clone();

        let woken = tokio::spawn(async move { waiter.cancelled().await });

        kill.cancel();
        kill.cancel();

        assert!(kill.is_cancelled());
        woken.await.unwrap();

        // A late waiter sees the already-fired token immediately.
        signals.kill.cancelled().await;
    }
}
