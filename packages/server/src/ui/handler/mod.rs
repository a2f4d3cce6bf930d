//! Request handlers for the HTTP API and the WebSocket sync protocol.

pub mod http;
pub mod websocket;
