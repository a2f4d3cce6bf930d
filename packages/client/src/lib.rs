//! CLI watch-party client library.
//!
//! Connects to an Enkai server room, mirrors playback sync events, and sends
//! chat. A session whose `session_id` matches the room's host identity also
//! gets `/play`, `/pause`, and `/seek` control over everyone's playback.

mod domain;
pub mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use error::ClientError;
pub use runner::run_client;
