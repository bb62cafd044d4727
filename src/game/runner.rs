//! The single task that owns the world and drives the fixed-rate tick

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::payments::SettlementEvent;
use crate::util::time::{tick_duration, Timer};
use crate::ws::hub::{ConnectionHub, Outbox};

use super::world::{Effects, Outbound, World};
use super::{PlayerCommand, PlayerId};

/// Everything a connection task can ask of the game loop
#[derive(Debug)]
pub enum Command {
    /// A socket was accepted; frames for it go to `outbox`
    Open { conn_id: PlayerId, outbox: Outbox },
    /// The connection authenticated and gets a player
    Register {
        conn_id: PlayerId,
        user_id: Uuid,
        display_name: String,
        wallet_balance: i64,
    },
    Player {
        conn_id: PlayerId,
        command: PlayerCommand,
    },
    Close {
        conn_id: PlayerId,
    },
}

/// Counters published by the loop for the health endpoint
#[derive(Debug, Default)]
pub struct LoopStats {
    ticks: AtomicU64,
    connections: AtomicUsize,
    players: AtomicUsize,
    queued: AtomicUsize,
    active_matches: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub ticks: u64,
    pub connections: usize,
    pub players: usize,
    pub queued: usize,
    pub active_matches: usize,
}

impl LoopStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            connections: self.connections.load(Ordering::Relaxed),
            players: self.players.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            active_matches: self.active_matches.load(Ordering::Relaxed),
        }
    }
}

/// Authoritative game loop
pub struct GameLoop {
    world: World,
    hub: ConnectionHub,
    commands: mpsc::Receiver<Command>,
    settlements: mpsc::Sender<SettlementEvent>,
    stats: Arc<LoopStats>,
    tick: Duration,
}

impl GameLoop {
    pub fn new(
        world: World,
        tick_rate: u32,
        commands: mpsc::Receiver<Command>,
        settlements: mpsc::Sender<SettlementEvent>,
        stats: Arc<LoopStats>,
    ) -> Self {
        Self {
            world,
            hub: ConnectionHub::new(),
            commands,
            settlements,
            stats,
            tick: tick_duration(tick_rate),
        }
    }

    /// Run until every command sender is gone
    pub async fn run(mut self) {
        info!(tick_ms = self.tick.as_millis() as u64, "Game loop started");

        let mut tick_interval = interval(self.tick);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            let timer = Timer::new();
            if !self.step() {
                break;
            }

            let elapsed = timer.elapsed();
            if elapsed > self.tick {
                warn!(
                    tick = self.world.tick_count(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Tick overran its budget"
                );
            }
        }

        info!(ticks = self.world.tick_count(), "Game loop stopped");
    }

    /// Drain pending commands and run one tick; false once the channel is closed
    pub fn step(&mut self) -> bool {
        let open = self.drain_commands();

        let effects = self.world.tick(self.tick);
        self.dispatch(effects);
        self.publish_stats();

        open
    }

    fn drain_commands(&mut self) -> bool {
        loop {
            match self.commands.try_recv() {
                Ok(command) => self.apply(command),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn apply(&mut self, command: Command) {
        let effects = match command {
            Command::Open { conn_id, outbox } => {
                self.hub.open(conn_id, outbox);
                debug!(conn_id = %conn_id, connections = self.hub.len(), "Connection opened");
                return;
            }
            Command::Register {
                conn_id,
                user_id,
                display_name,
                wallet_balance,
            } => self.world.register(conn_id, user_id, display_name, wallet_balance),
            Command::Player { conn_id, command } => self.world.handle(conn_id, command),
            Command::Close { conn_id } => {
                self.hub.close(&conn_id);
                debug!(conn_id = %conn_id, connections = self.hub.len(), "Connection closed");
                self.world.disconnect(conn_id)
            }
        };
        self.dispatch(effects);
    }

    fn dispatch(&mut self, effects: Effects) {
        for message in effects.messages {
            match message {
                Outbound::Broadcast(msg) => self.hub.broadcast(&msg),
                Outbound::To(conn_id, msg) => self.hub.send_to(&conn_id, &msg),
                Outbound::ToMany(conn_ids, msg) => self.hub.send_many(&conn_ids, &msg),
            }
        }

        for event in effects.settlements {
            match self.settlements.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(event)) => {
                    warn!(?event, "Settlement queue full, dropping event");
                }
                Err(TrySendError::Closed(_)) => {
                    warn!("Settlement worker gone, dropping event");
                }
            }
        }
    }

    fn publish_stats(&self) {
        self.stats.ticks.store(self.world.tick_count(), Ordering::Relaxed);
        self.stats.connections.store(self.hub.len(), Ordering::Relaxed);
        self.stats.players.store(self.world.player_count(), Ordering::Relaxed);
        self.stats.queued.store(self.world.queued_count(), Ordering::Relaxed);
        self.stats
            .active_matches
            .store(self.world.active_match_count(), Ordering::Relaxed);
    }
}
