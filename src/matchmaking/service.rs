//! Matchmaking service - per-tier queues and countdown-based match formation

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::game::player::PlayerRegistry;
use crate::game::PlayerId;
use crate::util::time::seconds_until;

use super::matches::Match;
use super::queue::{LobbySnapshot, QueuedPlayer, TierQueue};

/// Visible state of one tier's lobby
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobbyStatus {
    pub tier: u32,
    pub queued: usize,
    pub prize_pool: u64,
    /// Whole seconds until formation, while a countdown runs
    pub countdown: Option<u32>,
}

/// Something the queues want the rest of the server to know about
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    /// Lobby state for a tier changed
    Lobby(LobbyStatus),
    /// A match was formed and its queue cleared
    Formed(Match),
}

/// Matchmaking errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Unknown entry tier {0}")]
    UnknownTier(u32),

    #[error("Player is not registered")]
    NotRegistered,

    #[error("Already in a match")]
    AlreadyInMatch,

    #[error("Lobby for tier {0} is full")]
    QueueFull(u32),
}

/// Result of a successful join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Queued,
    /// Moved over from another tier's queue
    Switched { from: u32 },
    AlreadyQueued,
}

/// Matchmaking service
pub struct MatchmakingService {
    queues: BTreeMap<u32, TierQueue>,
    min_players: usize,
    max_players: usize,
    countdown: Duration,
}

impl MatchmakingService {
    pub fn new(tiers: &[u32], min_players: usize, max_players: usize, countdown: Duration) -> Self {
        Self {
            queues: tiers.iter().map(|&t| (t, TierQueue::new(t))).collect(),
            min_players: min_players.max(2),
            max_players: max_players.max(min_players.max(2)),
            countdown,
        }
    }

    /// Queue a registered player under `tier`.
    ///
    /// A player sits in at most one tier queue, so joining a different tier
    /// moves them.
    pub fn join_queue(
        &mut self,
        registry: &PlayerRegistry,
        player_id: PlayerId,
        tier: u32,
        now: Duration,
    ) -> Result<JoinOutcome, QueueError> {
        if !self.queues.contains_key(&tier) {
            return Err(QueueError::UnknownTier(tier));
        }
        let player = registry.get(&player_id).ok_or(QueueError::NotRegistered)?;

        let current = self.tier_of(&player_id);
        if current == Some(tier) {
            return Ok(JoinOutcome::AlreadyQueued);
        }

        let max_players = self.max_players;
        if self.queues.get(&tier).map(TierQueue::len).unwrap_or(0) >= max_players {
            return Err(QueueError::QueueFull(tier));
        }

        if let Some(from) = current {
            if let Some(queue) = self.queues.get_mut(&from) {
                queue.dequeue(&player_id);
            }
        }

        let queued = QueuedPlayer {
            player_id,
            user_id: player.user_id,
            display_name: player.display_name.clone(),
            queued_at: now,
        };
        if let Some(queue) = self.queues.get_mut(&tier) {
            queue.enqueue(queued);
            info!(player_id = %player_id, tier, queue_size = queue.len(), "Player joined matchmaking queue");
        }

        Ok(match current {
            Some(from) => JoinOutcome::Switched { from },
            None => JoinOutcome::Queued,
        })
    }

    /// Remove a player from every tier queue; returns the tier it was in
    pub fn leave_queue(&mut self, player_id: &PlayerId) -> Option<u32> {
        let mut left = None;
        for queue in self.queues.values_mut() {
            if queue.dequeue(player_id).is_some() {
                left = Some(queue.tier());
            }
        }
        if let Some(tier) = left {
            debug!(player_id = %player_id, tier, "Player left matchmaking queue");
        }
        left
    }

    pub fn tier_of(&self, player_id: &PlayerId) -> Option<u32> {
        self.queues
            .values()
            .find(|q| q.contains(player_id))
            .map(TierQueue::tier)
    }

    #[cfg(test)]
    pub fn queue_len(&self, tier: u32) -> usize {
        self.queues.get(&tier).map(TierQueue::len).unwrap_or(0)
    }

    /// Players waiting across all tiers
    pub fn queued_total(&self) -> usize {
        self.queues.values().map(TierQueue::len).sum()
    }

    /// Current state of every tier, for clients that just arrived
    pub fn lobbies(&self, now: Duration) -> Vec<LobbyStatus> {
        self.queues
            .values()
            .map(|queue| LobbyStatus {
                tier: queue.tier(),
                queued: queue.len(),
                prize_pool: queue.prize_pool(),
                countdown: self
                    .deadline(queue)
                    .map(|deadline| seconds_until(now, deadline)),
            })
            .collect()
    }

    /// The running deadline, or the one the queue is owed since it reached
    /// the minimum size
    fn deadline(&self, queue: &TierQueue) -> Option<Duration> {
        if queue.len() < self.min_players {
            return None;
        }
        queue
            .countdown_deadline()
            .or_else(|| queue.reached_at(self.min_players).map(|at| at + self.countdown))
    }

    /// Advance every tier's countdown and form matches that are due.
    ///
    /// Lobby events are only produced when a tier's visible state changed.
    pub fn tick(&mut self, now: Duration, now_millis: u64) -> Vec<QueueEvent> {
        let mut events = Vec::new();

        for queue in self.queues.values_mut() {
            let tier = queue.tier();
            let queued = queue.len();

            let countdown = if queued >= self.max_players {
                let players = queue.drain(self.max_players);
                events.push(Self::formed(tier, players, now_millis));
                None
            } else if queued >= self.min_players {
                let started = queue.reached_at(self.min_players).unwrap_or(now);
                let deadline = queue.ensure_countdown(started + self.countdown);
                if now >= deadline {
                    let players = queue.drain(queued);
                    events.push(Self::formed(tier, players, now_millis));
                    None
                } else {
                    Some(seconds_until(now, deadline))
                }
            } else {
                queue.clear_countdown();
                None
            };

            let snapshot = LobbySnapshot {
                queued: queue.len(),
                countdown,
            };
            if queue.mark_announced(snapshot) {
                events.push(QueueEvent::Lobby(LobbyStatus {
                    tier,
                    queued: snapshot.queued,
                    prize_pool: queue.prize_pool(),
                    countdown: snapshot.countdown,
                }));
            }
        }

        events
    }

    fn formed(tier: u32, players: Vec<QueuedPlayer>, now_millis: u64) -> QueueEvent {
        let record = Match::form(tier, players, now_millis);
        info!(
            match_id = %record.id,
            tier,
            player_count = record.participants().len(),
            prize_pool = record.prize_pool(),
            "Formed match"
        );
        QueueEvent::Formed(record)
    }
}
