//! Watch-party synchronization server library.
//!
//! This library implements the real-time core of Enkai: rooms that bind one
//! video URL to one host and any number of viewers, playback synchronization
//! under host authority, and chat fan-out over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
