//! Classification of server log output into domain events.
//!
//! The vanilla server announces everything the supervisor cares about as
//! plain log lines; this is the one place that knows the marker strings, so
//! a log-format change never touches the coordination logic.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ServerEvent {
    Ready,
    PlayerLoggedIn,
    PlayerDisconnected,
    PlayerCount(i32),
    SaveCompleted,
}

const READY_MARKER: &str = "[Server thread/INFO]: Done";
const LOGIN_MARKER: &str = "joined the game";
const DISCONNECT_MARKER: &str = "Disconnected";
const PLAYER_SUMMARY_MARKER: &str = "players online";
const SAVE_MARKER: &str = "[Server thread/INFO]: Saved the world";

pub(crate) fn classify(line: &str) -> Option<ServerEvent> {
    if line.contains(READY_MARKER) {
        Some(ServerEvent::Ready)
    } else if line.contains(LOGIN_MARKER) {
        Some(ServerEvent::PlayerLoggedIn)
    } else if line.contains(DISCONNECT_MARKER) {
        Some(ServerEvent::PlayerDisconnected)
    } else if line.contains(PLAYER_SUMMARY_MARKER) {
        parse_player_count(line).map(ServerEvent::PlayerCount)
    } else if line.contains(SAVE_MARKER) {
        Some(ServerEvent::SaveCompleted)
    } else {
        None
    }
}

/// The `/list` summary carries the count as an `n/m` token.
fn parse_player_count(line: &str) -> Option<i32> {
    line.split_whitespace()
        .filter(|word| word.contains('/'))
        .find_map(|word| word.split('/').next()?.parse().ok())
}
