//! Formed matches and their completion tracking

use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use crate::game::PlayerId;
use crate::ws::protocol::MatchPlayerInfo;

use super::queue::QueuedPlayer;

/// Participant captured at formation time
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPlayer {
    pub player_id: PlayerId,
    pub user_id: Uuid,
    pub display_name: String,
}

impl From<QueuedPlayer> for MatchPlayer {
    fn from(p: QueuedPlayer) -> Self {
        Self {
            player_id: p.player_id,
            user_id: p.user_id,
            display_name: p.display_name,
        }
    }
}

/// A formed match. Membership never changes after formation.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: Uuid,
    pub tier: u32,
    participants: Vec<MatchPlayer>,
    /// Unix millis
    pub created_at: u64,
}

impl Match {
    pub fn form(tier: u32, players: Vec<QueuedPlayer>, created_at: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            tier,
            participants: players.into_iter().map(MatchPlayer::from).collect(),
            created_at,
        }
    }

    pub fn participants(&self) -> &[MatchPlayer] {
        &self.participants
    }

    pub fn participant_ids(&self) -> Vec<PlayerId> {
        self.participants.iter().map(|p| p.player_id).collect()
    }

    pub fn prize_pool(&self) -> u64 {
        self.participants.len() as u64 * self.tier as u64
    }

    pub fn participant(&self, player_id: &PlayerId) -> Option<&MatchPlayer> {
        self.participants.iter().find(|p| &p.player_id == player_id)
    }

    pub fn info(&self) -> Vec<MatchPlayerInfo> {
        self.participants
            .iter()
            .map(|p| MatchPlayerInfo {
                player_id: p.player_id,
                user_id: p.user_id,
                username: p.display_name.clone(),
            })
            .collect()
    }
}

/// Final result of a match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub record: Match,
    pub winner: Option<MatchPlayer>,
    /// Best first: the winner, then the most recently knocked out
    pub placements: Vec<MatchPlayer>,
    /// Unix millis
    pub finished_at: u64,
}

struct ActiveMatch {
    record: Match,
    standing: BTreeSet<PlayerId>,
    knocked_out: Vec<PlayerId>,
}

/// Matches that still have more than one participant standing
#[derive(Default)]
pub struct ActiveMatches {
    matches: HashMap<Uuid, ActiveMatch>,
    by_player: HashMap<PlayerId, Uuid>,
}

impl ActiveMatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, record: Match) {
        let standing: BTreeSet<PlayerId> = record.participant_ids().into_iter().collect();
        for id in &standing {
            self.by_player.insert(*id, record.id);
        }
        self.matches.insert(
            record.id,
            ActiveMatch {
                record,
                standing,
                knocked_out: Vec::new(),
            },
        );
    }

    pub fn is_playing(&self, player_id: &PlayerId) -> bool {
        self.by_player.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Mark a participant as out (eliminated or disconnected).
    ///
    /// Returns the outcome when this leaves at most one participant standing.
    pub fn player_out(&mut self, player_id: &PlayerId, now_millis: u64) -> Option<MatchOutcome> {
        let match_id = self.by_player.remove(player_id)?;
        let active = self.matches.get_mut(&match_id)?;

        if active.standing.remove(player_id) {
            active.knocked_out.push(*player_id);
        }
        if active.standing.len() > 1 {
            return None;
        }

        let active = self.matches.remove(&match_id)?;
        for id in &active.standing {
            self.by_player.remove(id);
        }

        let winner = active
            .standing
            .iter()
            .next()
            .and_then(|id| active.record.participant(id))
            .cloned();

        let placements = winner
            .iter()
            .cloned()
            .chain(
                active
                    .knocked_out
                    .iter()
                    .rev()
                    .filter_map(|id| active.record.participant(id).cloned()),
            )
            .collect();

        Some(MatchOutcome {
            record: active.record,
            winner,
            placements,
            finished_at: now_millis,
        })
    }
}
