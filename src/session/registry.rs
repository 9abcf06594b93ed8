use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{mpsc, Notify, RwLock};

use super::events::RoomEvent;

/// Live call sessions, keyed by room name.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, mpsc::UnboundedSender<RoomEvent>>>,
    /// Woken whenever a session leaves.
    removed: Notify,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a room. Returns `None` if a session already owns it.
    pub async fn register(&self, room: &str) -> Option<mpsc::UnboundedReceiver<RoomEvent>> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(room) {
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        sessions.insert(room.to_string(), tx);
        Some(rx)
    }

    /// Deliver an event to the session owning `room`.
    /// Returns false when no live session wants it.
    pub async fn route(&self, room: &str, event: RoomEvent) -> bool {
        let sessions = self.sessions.read().await;
        match sessions.get(room) {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    pub async fn remove(&self, room: &str) {
        self.sessions.write().await.remove(room);
        self.removed.notify_waiters();
    }

    /// Wait until no session is registered. Returns false if sessions are
    /// still live after `timeout`.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let drained = async {
            loop {
                // Subscribe before checking so a removal in between is not lost
                let removed = self.removed.notified();
                if self.sessions.read().await.is_empty() {
                    return;
                }
                removed.await;
            }
        };

        tokio::time::timeout(timeout, drained).await.is_ok()
    }

    pub async fn active_rooms(&self) -> Vec<String> {
        let mut rooms: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        rooms.sort();
        rooms
    }

    /// Ask every session to stop. Returns how many were signalled.
    pub async fn shutdown_all(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .filter(|tx| tx.send(RoomEvent::Shutdown).is_ok())
            .count()
    }
}
