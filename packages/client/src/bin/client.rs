//! CLI watch-party client with reconnection support.
//!
//! Connects to a room on an Enkai server, prints playback sync and chat
//! events, and sends chat from stdin. Slash commands (/play, /pause, /seek)
//! control playback when this session is the room's host.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second
//! interval), which keeps a briefly offline host inside the server's grace
//! period.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin enkai-client -- --room-code abc12345 --username Alice
//! cargo run --bin enkai-client -- -r abc12345 -n Alice -s <session-id>
//! ```

use clap::Parser;

use enkai_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "enkai-client")]
#[command(about = "CLI watch-party client: join a room, chat, and follow the host's playback", long_about = None)]
struct Args {
    /// Code of the room to join
    #[arg(short = 'r', long)]
    room_code: String,

    /// Display name shown to other participants
    #[arg(short = 'n', long, default_value = "Anonymous")]
    username: String,

    /// Session identity; pass the room creator's to take the host role.
    /// Generated at random when omitted.
    #[arg(short = 's', long)]
    session_id: Option<String>,

    /// Server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let session_id = args.session_id.unwrap_or_else(|| {
        let generated = uuid::Uuid::new_v4().simple().to_string();
        tracing::info!(
            "Using generated session id '{}' (pass --session-id to reuse an identity)",
            generated
        );
        generated
    });

    // Run the client
    if let Err(e) =
        enkai_client::run_client(args.url, args.room_code, session_id, args.username).await
    {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
