//! Lobby actor implementation
//!
//! The central actor that owns all shared chat state: the client roster,
//! the room directory and the room expiry queue. Sessions talk to it only
//! through its event channel, and it handles one event at a time, so no
//! locks are needed.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::{Client, Roster};
use crate::command::Command;
use crate::config::Config;
use crate::error::ChatError;
use crate::expiry::{self, ExpiryQueue};
use crate::message::{notice, Message};
use crate::room::Room;
use crate::types::{ClientId, RoomId};

/// Events sent from sessions to the Lobby actor
#[derive(Debug)]
pub enum LobbyEvent {
    /// New connection wants to enter the roster
    Join(Client),
    /// Session read pump ended
    Leave { client_id: ClientId },
    /// A line arrived from a client
    Incoming(Message),
    /// Read-only view of the current state
    Inspect { reply: oneshot::Sender<LobbySnapshot> },
}

/// Point-in-time copy of lobby state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LobbySnapshot {
    /// Connected clients with their names and room names
    pub clients: Vec<ClientSnapshot>,
    /// Live rooms, ordered by name
    pub rooms: Vec<RoomSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
    pub id: ClientId,
    pub name: String,
    pub room: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub name: String,
    pub members: Vec<ClientId>,
    pub history: Vec<String>,
}

impl LobbySnapshot {
    pub fn client(&self, id: ClientId) -> Option<&ClientSnapshot> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn room(&self, name: &str) -> Option<&RoomSnapshot> {
        self.rooms.iter().find(|r| r.name == name)
    }
}

/// The Lobby actor
///
/// Sole owner and mutator of the roster and the room directory.
pub struct Lobby {
    /// All connected clients: ClientId -> Client
    clients: Roster,
    /// All live rooms: name -> Room
    rooms: BTreeMap<String, Room>,
    /// Pending room deletion checks
    expiry: ExpiryQueue,
    /// Roster capacity
    max_clients: usize,
    /// Idle lifetime given to new rooms
    room_ttl: Duration,
    /// Event receiver channel
    receiver: mpsc::Receiver<LobbyEvent>,
}

impl Lobby {
    /// Create a new Lobby with the given event receiver
    pub fn new(config: &Config, receiver: mpsc::Receiver<LobbyEvent>) -> Self {
        Self {
            clients: Roster::new(),
            rooms: BTreeMap::new(),
            expiry: ExpiryQueue::new(),
            max_clients: config.max_clients,
            room_ttl: config.room_ttl,
            receiver,
        }
    }

    /// Run the Lobby event loop
    ///
    /// Handles events and due expiry checks until all senders are dropped.
    pub async fn run(mut self) {
        info!("Lobby started");

        loop {
            let deadline = self.expiry.next_deadline();

            // Due expiry checks run before any event that arrived later
            tokio::select! {
                biased;
                () = expiry::sleep_until(deadline) => {
                    self.check_expired(Instant::now()).await;
                }
                event = self.receiver.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
            }
        }

        info!("Lobby shutting down");
    }

    /// Process a single event
    async fn handle_event(&mut self, event: LobbyEvent) {
        match event {
            LobbyEvent::Join(client) => self.handle_join(client).await,
            LobbyEvent::Leave { client_id } => self.handle_leave(client_id).await,
            LobbyEvent::Incoming(message) => self.dispatch(message).await,
            LobbyEvent::Inspect { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    /// Handle new client connection
    async fn handle_join(&mut self, client: Client) {
        if self.clients.contains_key(&client.id) {
            debug!("Client {} already in roster", client.id);
            return;
        }

        if self.clients.len() >= self.max_clients {
            warn!(
                "Rejecting client {}: server full ({} clients)",
                client.id, self.max_clients
            );
            let _ = client.send(ChatError::ServerFull.to_string()).await;
            client.disconnect();
            return;
        }

        info!("Client {} joined the lobby", client.id);
        let _ = client.send(notice::WELCOME).await;
        self.clients.insert(client.id, client);

        debug!(
            "Total clients: {}, Total rooms: {}",
            self.clients.len(),
            self.rooms.len()
        );
    }

    /// Handle client disconnection
    async fn handle_leave(&mut self, client_id: ClientId) {
        let Some(room_id) = self.clients.get(&client_id).map(|c| c.room) else {
            return;
        };

        if let Some(room_id) = room_id {
            self.leave_room(client_id, room_id).await;
        }

        // Dropping the record closes the outbound queue
        self.clients.remove(&client_id);
        info!("Client {} left the lobby", client_id);

        debug!(
            "Total clients: {}, Total rooms: {}",
            self.clients.len(),
            self.rooms.len()
        );
    }

    /// Route a line to a command handler or to the sender's room
    async fn dispatch(&mut self, message: Message) {
        let client_id = message.sender;
        if !self.clients.contains_key(&client_id) {
            debug!("Dropping message from unknown client {}", client_id);
            return;
        }

        let result = match Command::parse(&message.text) {
            Command::Help => {
                self.send_lines(client_id, notice::help()).await;
                Ok(())
            }
            Command::List => {
                self.list_rooms(client_id).await;
                Ok(())
            }
            Command::Create(name) => self.create_room(client_id, name).await,
            Command::Join(name) => self.join_room(client_id, name).await,
            Command::Leave => self.handle_leave_room(client_id).await,
            Command::Name(name) => self.rename(client_id, name).await,
            Command::Quit => {
                self.quit(client_id);
                Ok(())
            }
            Command::Chat(_) => self.send_to_room(&message).await,
        };

        if let Err(err) = result {
            debug!("Client {} rejected: {}", client_id, err);
            self.send_lines(client_id, [err.to_string()]).await;
        }
    }

    /// Broadcast chat content to the sender's room
    async fn send_to_room(&mut self, message: &Message) -> Result<(), ChatError> {
        let Some(client) = self.clients.get(&message.sender) else {
            return Ok(());
        };
        let room_id = client.room.ok_or(ChatError::SendInLobby)?;
        let line = message.chat_line(&client.name);

        if let Some(room) = find_room(&mut self.rooms, room_id) {
            room.broadcast(line, &self.clients).await;
            debug!("Client {} sent a message", message.sender);
        }
        Ok(())
    }

    /// Handle room creation
    async fn create_room(&mut self, client_id: ClientId, name: &str) -> Result<(), ChatError> {
        if name.is_empty() {
            return Err(ChatError::MissingName);
        }
        if self.rooms.contains_key(name) {
            return Err(ChatError::RoomExists);
        }

        let room = Room::new(name.to_string(), self.room_ttl);
        self.expiry.schedule(room.id, room.expiry());
        info!("Client {} created room {} ({})", client_id, name, room.id);
        self.rooms.insert(name.to_string(), room);

        self.send_lines(client_id, [notice::created(name)]).await;
        Ok(())
    }

    /// Handle room joining
    async fn join_room(&mut self, client_id: ClientId, name: &str) -> Result<(), ChatError> {
        if name.is_empty() {
            return Err(ChatError::MissingName);
        }
        if !self.rooms.contains_key(name) {
            return Err(ChatError::RoomNotFound);
        }

        let current = self.clients.get(&client_id).and_then(|c| c.room);
        if let Some(current) = current {
            self.leave_room(client_id, current).await;
        }

        if let Some(room) = self.rooms.get_mut(name) {
            room.join(client_id, &mut self.clients).await;
            info!("Client {} joined room {}", client_id, name);
        }
        Ok(())
    }

    /// Handle voluntary room leaving
    async fn handle_leave_room(&mut self, client_id: ClientId) -> Result<(), ChatError> {
        let room_id = self
            .clients
            .get(&client_id)
            .and_then(|c| c.room)
            .ok_or(ChatError::NotInRoom)?;

        self.leave_room(client_id, room_id).await;
        Ok(())
    }

    /// Handle display name change
    async fn rename(&mut self, client_id: ClientId, name: &str) -> Result<(), ChatError> {
        if name.is_empty() {
            return Err(ChatError::MissingName);
        }
        let Some(client) = self.clients.get(&client_id) else {
            return Ok(());
        };
        let old = client.name.clone();
        let room_id = client.room;

        match room_id {
            Some(room_id) => {
                if let Some(room) = find_room(&mut self.rooms, room_id) {
                    room.broadcast(notice::room_rename(&old, name), &self.clients)
                        .await;
                }
            }
            None => {
                self.send_lines(client_id, [notice::renamed(name)]).await;
            }
        }

        if let Some(client) = self.clients.get_mut(&client_id) {
            client.name = name.to_string();
        }
        info!("Client {} renamed from {:?} to {:?}", client_id, old, name);
        Ok(())
    }

    /// Send the room directory to the requester
    async fn list_rooms(&self, client_id: ClientId) {
        let lines = notice::room_list(self.rooms.keys().map(String::as_str));
        self.send_lines(client_id, lines).await;
    }

    /// Terminate the client's connection; its session reports the leave
    fn quit(&self, client_id: ClientId) {
        if let Some(client) = self.clients.get(&client_id) {
            info!("Client {} quit", client_id);
            client.disconnect();
        }
    }

    /// Run every due expiry check
    ///
    /// A room touched since its check was queued gets a new check at its
    /// current expiry instead of being deleted.
    async fn check_expired(&mut self, now: Instant) {
        for room_id in self.expiry.pop_due(now) {
            let Some(name) = self.room_name(room_id) else {
                continue;
            };
            let Some(expiry) = self.rooms.get(&name).map(Room::expiry) else {
                continue;
            };

            if expiry > now {
                debug!("Room {} still active, next check at {:?}", name, expiry);
                self.expiry.schedule(room_id, expiry);
                continue;
            }

            if let Some(room) = self.rooms.remove(&name) {
                room.delete(&mut self.clients).await;
                info!("Deleted inactive room {} ({})", name, room_id);
            }
        }
    }

    /// Helper: Remove a client from a room by id
    async fn leave_room(&mut self, client_id: ClientId, room_id: RoomId) {
        let Some(name) = self.room_name(room_id) else {
            return;
        };
        if let Some(room) = self.rooms.get_mut(&name) {
            room.leave(client_id, &mut self.clients).await;
            info!("Client {} left room {}", client_id, name);
        }
    }

    /// Helper: Queue lines for one client, ignoring a closed queue
    async fn send_lines<I>(&self, client_id: ClientId, lines: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if let Some(client) = self.clients.get(&client_id) {
            let _ = client.send_all(lines).await;
        }
    }

    fn room_name(&self, room_id: RoomId) -> Option<String> {
        self.rooms
            .values()
            .find(|r| r.id == room_id)
            .map(|r| r.name.clone())
    }

    fn snapshot(&self) -> LobbySnapshot {
        let room_names = |id: Option<RoomId>| {
            id.and_then(|id| self.rooms.values().find(|r| r.id == id))
                .map(|r| r.name.clone())
        };

        LobbySnapshot {
            clients: self
                .clients
                .values()
                .map(|c| ClientSnapshot {
                    id: c.id,
                    name: c.name.clone(),
                    room: room_names(c.room),
                })
                .collect(),
            rooms: self
                .rooms
                .values()
                .map(|r| RoomSnapshot {
                    name: r.name.clone(),
                    members: r.members().to_vec(),
                    history: r.history().to_vec(),
                })
                .collect(),
        }
    }
}

fn find_room(rooms: &mut BTreeMap<String, Room>, room_id: RoomId) -> Option<&mut Room> {
    rooms.values_mut().find(|r| r.id == room_id)
}

/// Ask a running Lobby for a snapshot of its state
pub async fn inspect(events: &mpsc::Sender<LobbyEvent>) -> Option<LobbySnapshot> {
    let (reply, rx) = oneshot::channel();
    events.send(LobbyEvent::Inspect { reply }).await.ok()?;
    rx.await.ok()
}
