//! Client execution logic with reconnection support.
//!
//! An unclean disconnect triggers bounded reconnection attempts. This is
//! also what keeps a reloading or briefly offline host inside the server's
//! grace period: reconnecting and re-joining with the same session ID
//! restores the host role before the room is torn down.

use std::time::Duration;

use crate::{
    domain::{should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    session::run_client_session,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the watch-party client with reconnection logic
pub async fn run_client(
    url: String,
    room_code: String,
    session_id: String,
    username: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Connecting to room '{}' at {} as '{}' (attempt {}/{})",
            room_code,
            url,
            username,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&url, &room_code, &session_id, &username).await {
            Ok(_) => {
                tracing::info!("Client session ended normally");
                // If connection ended normally (user exit), don't reconnect
                break;
            }
            Err(e) => {
                if let Some(client_err) = e.downcast_ref::<ClientError>() {
                    if should_exit_immediately(client_err) {
                        match client_err {
                            ClientError::RoomClosed => {
                                tracing::info!("{}", client_err);
                                return Ok(());
                            }
                            _ => {
                                tracing::error!("{}", client_err);
                                std::process::exit(1);
                            }
                        }
                    }

                    if !should_attempt_reconnect(client_err, reconnect_count, MAX_RECONNECT_ATTEMPTS)
                    {
                        tracing::error!(
                            "Failed to reconnect after {} attempts. Exiting.",
                            MAX_RECONNECT_ATTEMPTS
                        );
                        std::process::exit(1);
                    }
                }

                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if reconnect_count >= MAX_RECONNECT_ATTEMPTS {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    std::process::exit(1);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}
