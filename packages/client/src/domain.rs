//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use crate::error::ClientError;

/// Parsed user input: either a slash command or a chat line
#[derive(Debug, Clone, PartialEq)]
pub enum InputCommand {
    /// Plain chat line
    Chat(String),
    /// `/play`: resume playback at the current position (host only)
    Play,
    /// `/pause`: pause playback at the current position (host only)
    Pause,
    /// `/seek <seconds>`: jump to a position (host only)
    Seek(f64),
    /// `/ping`: measure round-trip latency to the server
    Ping,
    /// `/quit`: leave the room
    Quit,
    /// `/help`: show available commands
    Help,
}

/// Parse one input line into a command.
///
/// Lines starting with `/` are commands; anything else is chat.
///
/// # Returns
///
/// `Ok(InputCommand)` on success, `Err(message)` with a human-readable
/// explanation for unknown commands or bad arguments.
pub fn parse_input(line: &str) -> Result<InputCommand, String> {
    let line = line.trim();
    if !line.starts_with('/') {
        return Ok(InputCommand::Chat(line.to_string()));
    }

    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("/");
    match command {
        "/play" => Ok(InputCommand::Play),
        "/pause" => Ok(InputCommand::Pause),
        "/seek" => {
            let arg = parts
                .next()
                .ok_or_else(|| "Usage: /seek <seconds>".to_string())?;
            let seconds: f64 = arg
                .parse()
                .map_err(|_| format!("'{arg}' is not a number. Usage: /seek <seconds>"))?;
            if !seconds.is_finite() || seconds < 0.0 {
                return Err("Seek position must be a non-negative number".to_string());
            }
            Ok(InputCommand::Seek(seconds))
        }
        "/ping" => Ok(InputCommand::Ping),
        "/quit" => Ok(InputCommand::Quit),
        "/help" => Ok(InputCommand::Help),
        other => Err(format!("Unknown command '{other}'. Type /help for a list.")),
    }
}

/// Estimate the current playback position from the last sync event.
///
/// While playing, the position advances with wall-clock time; while paused
/// it stays where the last sync left it.
///
/// # Arguments
///
/// * `last_position` - Position carried by the last sync event (seconds)
/// * `is_playing` - Play/pause intent carried by the last sync event
/// * `elapsed_secs` - Wall-clock seconds since that sync event arrived
pub fn estimate_position(last_position: f64, is_playing: bool, elapsed_secs: f64) -> f64 {
    if is_playing {
        last_position + elapsed_secs
    } else {
        last_position
    }
}

/// Check if the client should exit immediately based on the error type.
///
/// A missing room will not appear by retrying, and a closed room is gone
/// for good, so neither warrants a reconnection attempt.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::RoomNotFound(_) | ClientError::RoomClosed
    )
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_exit_immediately(error) {
        return false;
    }

    current_attempt < max_attempts
}
