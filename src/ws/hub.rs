//! Outbound fan-out to open connections
//!
//! Each connection has three lanes. Events a client must see exactly once
//! (eliminations, match formation and completion, lobby and zone changes,
//! direct replies) go on a reliable lane. World snapshots replace each other
//! in a latest-frame slot. High-rate player and leaderboard updates go on a
//! bounded lane that sheds load when the client falls behind.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error};

use crate::game::PlayerId;

use super::protocol::ServerMsg;

/// Update frames buffered per connection before the hub starts shedding
pub const UPDATE_BUFFER: usize = 256;

/// Which outbound lane a message travels on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Reliable,
    /// Only the newest frame matters
    State,
    /// Superseded by the next one; safe to shed
    Update,
}

impl Lane {
    pub fn of(msg: &ServerMsg) -> Self {
        match msg {
            ServerMsg::GameState { .. } => Lane::State,
            ServerMsg::PlayerUpdate { .. } | ServerMsg::LeaderboardUpdate { .. } => Lane::Update,
            _ => Lane::Reliable,
        }
    }
}

/// Why a frame did not make it onto a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The update lane is full and the frame was shed
    Shed,
    /// The writer side is gone
    Closed,
}

/// Sending half of one connection's lanes
#[derive(Debug, Clone)]
pub struct Outbox {
    reliable: mpsc::UnboundedSender<Arc<str>>,
    state: Arc<watch::Sender<Option<Arc<str>>>>,
    updates: mpsc::Sender<Arc<str>>,
}

/// Receiving half, drained by the socket writer
#[derive(Debug)]
pub struct Inbox {
    reliable: mpsc::UnboundedReceiver<Arc<str>>,
    state: watch::Receiver<Option<Arc<str>>>,
    updates: mpsc::Receiver<Arc<str>>,
}

/// Lanes for a new connection, with room for `update_capacity` pending updates
pub fn outbox(update_capacity: usize) -> (Outbox, Inbox) {
    let (reliable_tx, reliable_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(None);
    let (updates_tx, updates_rx) = mpsc::channel(update_capacity);
    (
        Outbox {
            reliable: reliable_tx,
            state: Arc::new(state_tx),
            updates: updates_tx,
        },
        Inbox {
            reliable: reliable_rx,
            state: state_rx,
            updates: updates_rx,
        },
    )
}

impl Outbox {
    /// Queue `frame` on `lane` without waiting
    pub fn push(&self, lane: Lane, frame: Arc<str>) -> Result<(), DeliveryError> {
        match lane {
            Lane::Reliable => self.reliable.send(frame).map_err(|_| DeliveryError::Closed),
            Lane::State => {
                if self.state.is_closed() {
                    return Err(DeliveryError::Closed);
                }
                self.state.send_replace(Some(frame));
                Ok(())
            }
            Lane::Update => self.updates.try_send(frame).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => DeliveryError::Shed,
                mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
            }),
        }
    }
}

impl Inbox {
    /// Next frame to write: reliable first, then the newest snapshot, then
    /// updates. None once every sender is gone.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        loop {
            tokio::select! {
                biased;
                Some(frame) = self.reliable.recv() => return Some(frame),
                Ok(()) = self.state.changed() => {
                    if let Some(frame) = self.state.borrow_and_update().clone() {
                        return Some(frame);
                    }
                }
                Some(frame) = self.updates.recv() => return Some(frame),
                else => return None,
            }
        }
    }

    /// Whatever is ready right now, in the same order as `recv`
    #[cfg(test)]
    pub fn try_recv(&mut self) -> Option<Arc<str>> {
        if let Ok(frame) = self.reliable.try_recv() {
            return Some(frame);
        }
        if self.state.has_changed().unwrap_or(false) {
            if let Some(frame) = self.state.borrow_and_update().clone() {
                return Some(frame);
            }
        }
        self.updates.try_recv().ok()
    }
}

/// Per-connection outboxes, owned by the game loop
#[derive(Default)]
pub struct ConnectionHub {
    connections: HashMap<PlayerId, Outbox>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, conn_id: PlayerId, outbox: Outbox) {
        self.connections.insert(conn_id, outbox);
    }

    pub fn close(&mut self, conn_id: &PlayerId) -> bool {
        self.connections.remove(conn_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Serialize once so every recipient shares the same frame
    pub fn encode(msg: &ServerMsg) -> Option<Arc<str>> {
        match serde_json::to_string(msg) {
            Ok(json) => Some(Arc::from(json)),
            Err(e) => {
                error!(error = %e, "Failed to serialize server message");
                None
            }
        }
    }

    pub fn send_to(&self, conn_id: &PlayerId, msg: &ServerMsg) {
        if let Some(frame) = Self::encode(msg) {
            self.deliver(conn_id, Lane::of(msg), frame);
        }
    }

    pub fn send_many(&self, conn_ids: &[PlayerId], msg: &ServerMsg) {
        if let Some(frame) = Self::encode(msg) {
            let lane = Lane::of(msg);
            for conn_id in conn_ids {
                self.deliver(conn_id, lane, frame.clone());
            }
        }
    }

    pub fn broadcast(&self, msg: &ServerMsg) {
        if let Some(frame) = Self::encode(msg) {
            let lane = Lane::of(msg);
            for conn_id in self.connections.keys() {
                self.deliver(conn_id, lane, frame.clone());
            }
        }
    }

    /// A slow or closed connection never stalls the loop
    fn deliver(&self, conn_id: &PlayerId, lane: Lane, frame: Arc<str>) {
        let Some(outbox) = self.connections.get(conn_id) else {
            return;
        };
        match outbox.push(lane, frame) {
            Ok(()) => {}
            Err(DeliveryError::Shed) => {
                debug!(conn_id = %conn_id, "Update lane full, shedding frame");
            }
            Err(DeliveryError::Closed) => {
                debug!(conn_id = %conn_id, ?lane, "Outbound lane closed");
            }
        }
    }
}
