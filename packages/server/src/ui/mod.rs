//! Watch-party server UI layer (HTTP / WebSocket endpoints).

pub mod handler;
mod server;
mod signal;
pub mod state; // UseCase の組み立て側（bin）からアクセスするため public

pub use server::Server;
