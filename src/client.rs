//! Client struct definition
//!
//! The lobby's record of one connected client: identity, current room
//! and the handles that reach its session.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::SendError;
use crate::message::DEFAULT_NAME;
use crate::types::{ClientId, RoomId};

/// All connected clients, keyed by id. Owned by the lobby.
pub type Roster = HashMap<ClientId, Client>;

/// Connected client information
///
/// Dropping a `Client` drops the last outbound sender, which lets the
/// session write pump drain its queue and exit.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for this client
    pub id: ClientId,
    /// Display name, "Anonymous" until changed
    pub name: String,
    /// Room the client is in, if any
    pub room: Option<RoomId>,
    /// Lobby → client line channel
    pub sender: mpsc::Sender<String>,
    /// Cancelling this ends the session's read pump
    pub shutdown: CancellationToken,
}

impl Client {
    /// Create a new client in the lobby with the default name
    pub fn new(id: ClientId, sender: mpsc::Sender<String>, shutdown: CancellationToken) -> Self {
        Self {
            id,
            name: DEFAULT_NAME.to_string(),
            room: None,
            sender,
            shutdown,
        }
    }

    /// Queue one line for this client
    ///
    /// Waits while the outbound queue is full. Returns an error if the
    /// write pump has gone away.
    pub async fn send(&self, line: impl Into<String>) -> Result<(), SendError> {
        self.sender
            .send(line.into())
            .await
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Queue several lines, in order, stopping at the first failure
    pub async fn send_all<I>(&self, lines: I) -> Result<(), SendError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for line in lines {
            self.send(line).await?;
        }
        Ok(())
    }

    /// Terminate the underlying connection
    pub fn disconnect(&self) {
        self.shutdown.cancel();
    }
}
