//! Room expiry scheduling
//!
//! A min-heap of pending deletion checks, polled by the lobby loop. One
//! queue serves every room, so no timer task exists per room and tests can
//! drive expiry with tokio's paused clock.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tokio::time::Instant;

use crate::types::RoomId;

/// Pending room deletion checks, earliest first
#[derive(Debug, Default)]
pub struct ExpiryQueue {
    heap: BinaryHeap<Reverse<(Instant, RoomId)>>,
}

impl ExpiryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a check of `room` at `at`
    pub fn schedule(&mut self, room: RoomId, at: Instant) {
        self.heap.push(Reverse((at, room)));
    }

    /// When the earliest check is due, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse((at, _))| *at)
    }

    /// Remove and return every check due at or before `now`, earliest first
    pub fn pop_due(&mut self, now: Instant) -> Vec<RoomId> {
        let mut due = Vec::new();
        while let Some(Reverse((at, room))) = self.heap.peek().copied() {
            if at > now {
                break;
            }
            self.heap.pop();
            due.push(room);
        }
        due
    }
}

/// Sleep until `deadline`, or forever when there is none
pub async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
