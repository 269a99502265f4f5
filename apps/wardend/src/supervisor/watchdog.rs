//! Activity watchdog: decides when to stop the server for inactivity.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::signals::WatchdogSignals;

/// Two-strike idle state machine. A zero-player observation marks the server
/// inactive; only a second zero-player observation on a later timer tick
/// actually triggers the stop, so one transient empty report (a reconnect
/// window, say) never shuts the server down. Any login or positive count
/// resets the strike. The timer re-arms after every handled event.
pub(crate) async fn run(
    mut signals: WatchdogSignals,
    kill: CancellationToken,
    idle_interval: Duration,
) {
    let mut inactive = false;

    loop {
        tokio::select! {
            Some(()) = signals.login.recv() => {
                inactive = false;
            }
            Some(()) = signals.disconnect.recv() => {
                let Some(count) = player_count(&mut signals, &kill).await else {
                    return;
                };
                if count <= 0 {
                    inactive = true;
                    info!(
                        "no players left on the server, shutting down in {}s unless someone returns",
                        idle_interval.as_secs()
                    );
                } else {
                    inactive = false;
                }
            }
            _ = sleep(idle_interval) => {
                let Some(count) = player_count(&mut signals, &kill).await else {
                    return;
                };
                if count > 0 {
                    inactive = false;
                } else if inactive {
                    let sent = tokio::select! {
                        result = signals.stop.send(()) => result.is_ok(),
                        _ = kill.cancelled() => false,
                    };
                    if !sent {
                        return;
                    }
                    info!("shutting down the server due to inactivity");
                } else {
                    inactive = true;
                }
            }
            _ = kill.cancelled() => return,
        }
    }
}

/// The CheckPlayers/PlayerCount exchange: request `/list`, then park until
/// the monitor answers. One atomic logical step for the caller; `None` means
/// the run is unwinding.
async fn player_count(signals: &mut WatchdogSignals, kill: &CancellationToken) -> Option<i32> {
    tokio::select! {
        result = signals.check_players.send(()) => result.ok()?,
        _ = kill.cancelled() => return None,
    }
    tokio::select! {
        count = signals.players.recv() => count,
        _ = kill.cancelled() => None,
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use super::*;
    use crate::supervisor::signals::Signals;

    const IDLE: Duration = Duration::from_secs(10);

    /// Answers every `/list` request with the next scripted count, repeating
    /// the last one forever.
    fn answer_counts(
        mut check_players: mpsc::Receiver<()>,
        players: mpsc::Sender<i32>,
        counts: Vec<i32>,
    ) {
        tokio::spawn(async move {
            let mut counts = counts.into_iter();
            let mut current = 0;
            while check_players.recv().await.is_some() {
                current = counts.next().unwrap_or(current);
                if players.send(current).await.is_err() {
                    return;
                }
            }
        });
    }

    #[tokio::test(start_paused = true)]
    async fn stop_fires_on_the_second_idle_tick_not_the_first() {
        let signals = Signals::new();
        let kill = signals.kill.clone();
        let mut dispatcher = signals.dispatcher;
        let monitor = signals.monitor;

        let started = Instant::now();
        tokio::spawn(run(signals.watchdog, kill.clone(), IDLE));
        answer_counts(dispatcher.check_players, monitor.players, vec![0]);

        dispatcher.stop.recv().await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= IDLE * 2, "stopped after one strike: {elapsed:?}");
        assert!(elapsed < IDLE * 3, "stop took too long: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn a_login_resets_the_strike() {
        let signals = Signals::new();
        let kill = signals.kill.clone();
        let mut dispatcher = signals.dispatcher;
        let monitor = signals.monitor;

        let started = Instant::now();
        tokio::spawn(run(signals.watchdog, kill.clone(), IDLE));

        let mut check_players = dispatcher.check_players;
        let players = monitor.players;

        // First tick observes zero players; then a player logs in.
        check_players.recv().await.unwrap();
        players.send(0).await.unwrap();
        monitor.login.send(()).await.unwrap();

        // The next empty tick is a fresh first strike, not the second.
        check_players.recv().await.unwrap();
        players.send(0).await.unwrap();

        check_players.recv().await.unwrap();
        players.send(0).await.unwrap();

        dispatcher.stop.recv().await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= IDLE * 3, "login did not reset the strike: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn a_disconnect_with_zero_players_counts_as_the_first_strike() {
        let signals = Signals::new();
        let kill = signals.kill.clone();
        let mut dispatcher = signals.dispatcher;
        let monitor = signals.monitor;

        let started = Instant::now();
        tokio::spawn(run(signals.watchdog, kill.clone(), IDLE));
        answer_counts(dispatcher.check_players, monitor.players, vec![0]);

        monitor.disconnect.send(()).await.unwrap();

        dispatcher.stop.recv().await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed < IDLE * 2, "disconnect strike was ignored: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn a_positive_count_keeps_the_server_alive() {
        let signals = Signals::new();
        let kill = signals.kill.clone();
        let mut dispatcher = signals.dispatcher;
        let monitor = signals.monitor;

        tokio::spawn(run(signals.watchdog, kill.clone(), IDLE));
        answer_counts(dispatcher.check_players, monitor.players, vec![0, 2, 0, 0]);

        // Ticks: 0 (strike), 2 (reset), 0 (strike), 0 (stop).
        let started = Instant::now();
        dispatcher.stop.recv().await.unwrap();
        assert!(started.elapsed() >= IDLE * 4);
    }
}
