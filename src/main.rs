//! Multi-room Line Chat Server - Entry Point
//!
//! Starts the TCP listener and Lobby actor, accepting connections.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chat_lobby::{handle_connection, Config, Lobby};

/// Channel buffer size for lobby events
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_lobby=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_lobby=info")),
        )
        .init();

    let mut config = Config::from_env()?;

    // A bind address on the command line wins over the environment
    if let Some(addr) = env::args().nth(1) {
        config.bind_address = addr;
    }
    info!("Starting with {:?}", config);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Chat server listening on {}", config.bind_address);

    // Create Lobby actor channel and start
    let (events_tx, events_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    tokio::spawn(Lobby::new(&config, events_rx).run());

    info!("Lobby actor started");

    let config = Arc::new(config);

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let events_tx = events_tx.clone();
                let config = Arc::clone(&config);

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, events_tx, &config).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
