//! Message formatting utilities for client display.

/// Render a position in seconds as `mm:ss` (or `h:mm:ss` past an hour)
pub fn format_position(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the role message received after joining
    pub fn format_role(is_host: bool, video_url: &str) -> String {
        let role = if is_host {
            "HOST (you control playback: /play /pause /seek)"
        } else {
            "viewer (playback follows the host)"
        };
        format!(
            "\n============================================================\n\
             Joined as {}\n\
             Now watching: {}\n\
             ============================================================\n",
            role, video_url
        )
    }

    /// Format a playback sync event
    pub fn format_sync(current_time: f64, is_playing: bool) -> String {
        let action = if is_playing { "▶ playing" } else { "⏸ paused" };
        format!("\n{} at {}\n", action, format_position(current_time))
    }

    /// Format a chat message
    pub fn format_chat_message(username: &str, message: &str) -> String {
        format!("\n@{}: {}\n", username, message)
    }

    /// Format a user-joined notification
    pub fn format_user_joined(username: &str) -> String {
        format!("\n+ {} joined the party\n", username)
    }

    /// Format a user-left notification
    pub fn format_user_left(username: &str) -> String {
        format!("\n- {} left the party\n", username)
    }

    /// Format the room-closed notice
    pub fn format_room_closed(message: &str) -> String {
        format!(
            "\n============================================================\n\
             {}\n\
             ============================================================\n",
            message
        )
    }

    /// Format a server error report
    pub fn format_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }

    /// Format a latency measurement result
    pub fn format_pong(rtt_millis: u128) -> String {
        format!("\npong: {} ms round trip\n", rtt_millis)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }

    /// Format the /help output
    pub fn format_help() -> String {
        "\nCommands:\n\
         /play          resume playback (host only)\n\
         /pause         pause playback (host only)\n\
         /seek <secs>   jump to a position (host only)\n\
         /ping          measure latency to the server\n\
         /quit          leave the room\n\
         Anything else is sent as chat.\n"
            .to_string()
    }
}
