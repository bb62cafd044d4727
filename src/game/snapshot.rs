//! Snapshot building for network transmission

use std::time::Duration;

use crate::ws::protocol::ServerMsg;

use super::food::FoodField;
use super::player::PlayerRegistry;
use super::zone::Zone;

/// Decides when full `game_state` snapshots go out and builds them
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for eliminations)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    pub fn build(registry: &PlayerRegistry, food: &FoodField, zone: &Zone, now: Duration) -> ServerMsg {
        ServerMsg::GameState {
            players: registry.iter().map(|p| p.view()).collect(),
            foods: food.views(),
            zone: zone.view(now),
        }
    }
}
