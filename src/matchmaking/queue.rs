//! Per-tier matchmaking queue

use std::time::Duration;
use uuid::Uuid;

use crate::game::PlayerId;

/// Player in a matchmaking queue
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedPlayer {
    pub player_id: PlayerId,
    pub user_id: Uuid,
    pub display_name: String,
    /// Game clock time the player queued at
    pub queued_at: Duration,
}

/// What the lobby looked like the last time it was announced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobbySnapshot {
    pub queued: usize,
    pub countdown: Option<u32>,
}

/// Pending players for one entry-fee tier
#[derive(Debug)]
pub struct TierQueue {
    tier: u32,
    /// Join order is kept so a full queue drains oldest first
    pending: Vec<QueuedPlayer>,
    countdown_deadline: Option<Duration>,
    last_announced: Option<LobbySnapshot>,
}

impl TierQueue {
    pub fn new(tier: u32) -> Self {
        Self {
            tier,
            pending: Vec::new(),
            countdown_deadline: None,
            last_announced: None,
        }
    }

    pub fn tier(&self) -> u32 {
        self.tier
    }

    /// Add a player; returns false if already queued here
    pub fn enqueue(&mut self, player: QueuedPlayer) -> bool {
        if self.contains(&player.player_id) {
            return false;
        }
        self.pending.push(player);
        true
    }

    /// Remove a player from the queue
    pub fn dequeue(&mut self, player_id: &PlayerId) -> Option<QueuedPlayer> {
        let pos = self.pending.iter().position(|p| &p.player_id == player_id)?;
        Some(self.pending.remove(pos))
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.pending.iter().any(|p| &p.player_id == player_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Stake-weighted pool for the players currently queued
    pub fn prize_pool(&self) -> u64 {
        self.pending.len() as u64 * self.tier as u64
    }

    pub fn countdown_deadline(&self) -> Option<Duration> {
        self.countdown_deadline
    }

    /// When the queue first held `count` of its current players
    pub fn reached_at(&self, count: usize) -> Option<Duration> {
        let index = count.checked_sub(1)?;
        self.pending.get(index).map(|p| p.queued_at)
    }

    /// Start the countdown unless one is already running
    pub fn ensure_countdown(&mut self, deadline: Duration) -> Duration {
        *self.countdown_deadline.get_or_insert(deadline)
    }

    pub fn clear_countdown(&mut self) {
        self.countdown_deadline = None;
    }

    /// Take up to `max` players in join order and reset the countdown
    pub fn drain(&mut self, max: usize) -> Vec<QueuedPlayer> {
        let count = self.pending.len().min(max);
        self.countdown_deadline = None;
        self.pending.drain(..count).collect()
    }

    /// Record `snapshot` as announced; returns false when it matches the last one
    pub fn mark_announced(&mut self, snapshot: LobbySnapshot) -> bool {
        if self.last_announced == Some(snapshot) {
            return false;
        }
        self.last_announced = Some(snapshot);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued(n: u128) -> QueuedPlayer {
        queued_at(n, Duration::ZERO)
    }

    fn queued_at(n: u128, at: Duration) -> QueuedPlayer {
        QueuedPlayer {
            player_id: Uuid::from_u128(n),
            user_id: Uuid::from_u128(n + 500),
            display_name: format!("p{n}"),
            queued_at: at,
        }
    }

    #[test]
    fn enqueue_is_idempotent_per_player() {
        let mut queue = TierQueue::new(5);
        assert!(queue.enqueue(queued(1)));
        assert!(!queue.enqueue(queued(1)));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.prize_pool(), 5);
    }

    #[test]
    fn dequeue_missing_player_is_none() {
        let mut queue = TierQueue::new(1);
        queue.enqueue(queued(1));
        assert!(queue.dequeue(&Uuid::from_u128(2)).is_none());
        assert!(queue.dequeue(&Uuid::from_u128(1)).is_some());
        assert!(queue.dequeue(&Uuid::from_u128(1)).is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_takes_oldest_first_and_resets_countdown() {
        let mut queue = TierQueue::new(20);
        for n in 0..5 {
            queue.enqueue(queued(n));
        }
        queue.ensure_countdown(Duration::from_secs(10));

        let taken = queue.drain(3);
        assert_eq!(
            taken.iter().map(|p| p.player_id.as_u128()).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(queue.len(), 2);
        assert!(queue.countdown_deadline().is_none());
    }

    #[test]
    fn running_countdown_is_kept() {
        let mut queue = TierQueue::new(1);
        assert_eq!(queue.ensure_countdown(Duration::from_secs(10)), Duration::from_secs(10));
        assert_eq!(queue.ensure_countdown(Duration::from_secs(15)), Duration::from_secs(10));
    }

    #[test]
    fn unchanged_lobby_is_not_reannounced() {
        let mut queue = TierQueue::new(1);
        let snap = LobbySnapshot {
            queued: 2,
            countdown: Some(10),
        };
        assert!(queue.mark_announced(snap));
        assert!(!queue.mark_announced(snap));
        assert!(queue.mark_announced(LobbySnapshot {
            queued: 2,
            countdown: Some(9),
        }));
    }

    #[test]
    fn reached_at_follows_join_order() {
        let mut queue = TierQueue::new(5);
        assert_eq!(queue.reached_at(2), None);
        queue.enqueue(queued_at(1, Duration::from_secs(1)));
        queue.enqueue(queued_at(2, Duration::from_secs(3)));
        queue.enqueue(queued_at(3, Duration::from_secs(4)));
        assert_eq!(queue.reached_at(2), Some(Duration::from_secs(3)));

        queue.dequeue(&Uuid::from_u128(1));
        assert_eq!(queue.reached_at(2), Some(Duration::from_secs(4)));
        assert_eq!(queue.reached_at(0), None);
    }
}
