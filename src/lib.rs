//! Multi-room Line Chat Server Library
//!
//! A newline-delimited text chat server built on tokio, where clients meet
//! in named, short-lived chat rooms.
//!
//! # Features
//! - Plain text over any byte stream (TCP in the binary)
//! - `/create`, `/join`, `/leave`, `/list`, `/name`, `/help`, `/quit`
//! - Room history replayed to every new member
//! - Rooms deleted after a configurable idle time
//! - Capacity-limited client roster
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `Lobby` is the central actor owning every client and room
//! - Each connection runs a read pump and a write pump
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use chat_lobby::{handle_connection, Config, Lobby};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let listener = TcpListener::bind(&config.bind_address).await.unwrap();
//!     let (events_tx, events_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(Lobby::new(&config, events_rx).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         handle_connection(stream, events_tx.clone(), &config).await.unwrap();
//!     }
//! }
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod expiry;
pub mod lobby;
pub mod message;
pub mod room;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use client::Client;
pub use command::Command;
pub use config::{Config, ConfigError};
pub use error::{AppError, ChatError, SendError};
pub use lobby::{inspect, Lobby, LobbyEvent, LobbySnapshot};
pub use message::Message;
pub use room::Room;
pub use session::{handle_connection, Session};
pub use types::{ClientId, RoomId};
