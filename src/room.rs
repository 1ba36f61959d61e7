//! Room struct definition
//!
//! A named broadcast group with ordered membership, an append-only
//! history and an idle-expiry instant. Rooms only hold client ids; the
//! client records themselves live in the lobby's roster and are passed in.

use std::time::Duration;

use tokio::time::Instant;

use crate::client::Roster;
use crate::message::notice;
use crate::types::{ClientId, RoomId};

/// Chat room
#[derive(Debug)]
pub struct Room {
    /// Identity of this room instance
    pub id: RoomId,
    /// Directory key
    pub name: String,
    /// Members in join order, no duplicates
    members: Vec<ClientId>,
    /// Every line broadcast so far, oldest first
    history: Vec<String>,
    /// Instant after which the room may be deleted
    expiry: Instant,
    /// Idle time allowed after each broadcast
    ttl: Duration,
}

impl Room {
    /// Create an empty room expiring `ttl` from now
    pub fn new(name: String, ttl: Duration) -> Self {
        Self {
            id: RoomId::new(),
            name,
            members: Vec::new(),
            history: Vec::new(),
            expiry: Instant::now() + ttl,
            ttl,
        }
    }

    pub fn members(&self) -> &[ClientId] {
        &self.members
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn expiry(&self) -> Instant {
        self.expiry
    }

    pub fn contains(&self, client_id: ClientId) -> bool {
        self.members.contains(&client_id)
    }

    /// Add a client to the room
    ///
    /// The full history is queued to the joiner before the join notice is
    /// broadcast, so the joiner always sees old lines first.
    pub async fn join(&mut self, client_id: ClientId, roster: &mut Roster) {
        let Some(client) = roster.get_mut(&client_id) else {
            return;
        };

        client.room = Some(self.id);
        let _ = client.send_all(self.history.iter().cloned()).await;

        if !self.contains(client_id) {
            self.members.push(client_id);
        }

        let joined = notice::room_join(&client.name);
        self.broadcast(joined, roster).await;
    }

    /// Remove a client from the room
    ///
    /// The departure notice goes out first, so the leaver receives it too.
    pub async fn leave(&mut self, client_id: ClientId, roster: &mut Roster) {
        let Some(name) = roster.get(&client_id).map(|c| c.name.clone()) else {
            return;
        };

        self.broadcast(notice::room_leave(&name), roster).await;
        self.members.retain(|&id| id != client_id);

        if let Some(client) = roster.get_mut(&client_id) {
            if client.room == Some(self.id) {
                client.room = None;
            }
        }
    }

    /// Record a line and queue it for every member
    ///
    /// Members are served one after another in join order; a member with
    /// a full outbound queue holds up the ones after it.
    pub async fn broadcast(&mut self, line: String, roster: &Roster) {
        self.expiry = Instant::now() + self.ttl;
        self.history.push(line.clone());

        for member in &self.members {
            if let Some(client) = roster.get(member) {
                let _ = client.send(line.clone()).await;
            }
        }
    }

    /// Announce deletion and return every member to the lobby
    ///
    /// Connections are left open.
    pub async fn delete(mut self, roster: &mut Roster) {
        self.broadcast(notice::ROOM_DELETED.to_string(), roster).await;

        for member in &self.members {
            if let Some(client) = roster.get_mut(member) {
                client.room = None;
            }
        }
    }
}
