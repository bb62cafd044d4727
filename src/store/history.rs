//! Completed match records and per-player stats

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matchmaking::MatchOutcome;
use crate::ws::protocol::ProfileStats;

use super::supabase::{SupabaseClient, SupabaseError};

/// One participant's result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementRecord {
    pub user_id: Uuid,
    pub display_name: String,
    /// 1 is the winner
    pub placement: u32,
    pub prize_cents: i64,
}

/// Everything persisted about a finished match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub match_id: Uuid,
    pub tier: u32,
    pub prize_pool_cents: i64,
    pub winner_user_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub placements: Vec<PlacementRecord>,
}

fn from_millis(millis: u64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis as i64)
        .single()
        .unwrap_or_default()
}

impl MatchRecord {
    /// Build the record for a completed match, prize in cents to the winner
    pub fn from_outcome(outcome: &MatchOutcome, prize_cents: i64) -> Self {
        let winner = outcome.winner.as_ref().map(|w| w.player_id);
        let placements = outcome
            .placements
            .iter()
            .enumerate()
            .map(|(i, p)| PlacementRecord {
                user_id: p.user_id,
                display_name: p.display_name.clone(),
                placement: i as u32 + 1,
                prize_cents: if Some(p.player_id) == winner { prize_cents } else { 0 },
            })
            .collect();

        Self {
            match_id: outcome.record.id,
            tier: outcome.record.tier,
            prize_pool_cents: prize_cents,
            winner_user_id: outcome.winner.as_ref().map(|w| w.user_id),
            started_at: from_millis(outcome.record.created_at),
            ended_at: from_millis(outcome.finished_at),
            placements,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("History store unavailable: {0}")]
    Upstream(#[from] SupabaseError),
}

#[async_trait]
pub trait MatchHistory: Send + Sync {
    async fn record_match(&self, record: MatchRecord) -> Result<(), HistoryError>;

    /// None when the player has never finished a match
    async fn player_stats(&self, user_id: Uuid) -> Result<Option<ProfileStats>, HistoryError>;
}

#[derive(Debug, Serialize)]
struct MatchRow {
    id: Uuid,
    tier: u32,
    prize_pool_cents: i64,
    winner_user_id: Option<Uuid>,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    match_id: Uuid,
    #[serde(flatten)]
    placement: &'a PlacementRecord,
}

#[derive(Debug, Deserialize)]
struct StatsRow {
    matches_played: u32,
    wins: u32,
    total_prize_cents: i64,
}

pub struct SupabaseHistory {
    client: SupabaseClient,
}

impl SupabaseHistory {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MatchHistory for SupabaseHistory {
    async fn record_match(&self, record: MatchRecord) -> Result<(), HistoryError> {
        let row = MatchRow {
            id: record.match_id,
            tier: record.tier,
            prize_pool_cents: record.prize_pool_cents,
            winner_user_id: record.winner_user_id,
            started_at: record.started_at,
            ended_at: record.ended_at,
        };
        self.client.insert_many("matches", std::slice::from_ref(&row)).await?;

        let results: Vec<ResultRow<'_>> = record
            .placements
            .iter()
            .map(|placement| ResultRow {
                match_id: record.match_id,
                placement,
            })
            .collect();
        self.client.insert_many("match_results", &results).await?;
        Ok(())
    }

    async fn player_stats(&self, user_id: Uuid) -> Result<Option<ProfileStats>, HistoryError> {
        let query = format!(
            "user_id=eq.{}&select=matches_played,wins,total_prize_cents",
            user_id
        );
        let row: Option<StatsRow> = self.client.get_one("player_stats", &query).await?;
        Ok(row.map(|r| ProfileStats {
            matches_played: r.matches_played,
            wins: r.wins,
            total_prize_cents: r.total_prize_cents,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchmaking::{ActiveMatches, Match};
    use crate::matchmaking::queue::QueuedPlayer;
    use std::time::Duration;

    fn outcome() -> MatchOutcome {
        let players = (1..=3)
            .map(|n| QueuedPlayer {
                player_id: Uuid::from_u128(n),
                user_id: Uuid::from_u128(n + 10),
                display_name: format!("p{n}"),
                queued_at: Duration::ZERO,
            })
            .collect();
        let mut active = ActiveMatches::new();
        active.start(Match::form(5, players, 1_000));
        active.player_out(&Uuid::from_u128(1), 5_000);
        active.player_out(&Uuid::from_u128(2), 9_000).unwrap()
    }

    #[test]
    fn record_places_winner_first_with_the_prize() {
        let record = MatchRecord::from_outcome(&outcome(), 1_500);
        assert_eq!(record.winner_user_id, Some(Uuid::from_u128(13)));
        assert_eq!(record.ended_at.timestamp_millis(), 9_000);

        let placed: Vec<(u128, u32, i64)> = record
            .placements
            .iter()
            .map(|p| (p.user_id.as_u128(), p.placement, p.prize_cents))
            .collect();
        assert_eq!(placed, vec![(13, 1, 1_500), (12, 2, 0), (11, 3, 0)]);
    }

    #[test]
    fn result_rows_flatten_placement() {
        let placement = PlacementRecord {
            user_id: Uuid::from_u128(1),
            display_name: "ace".into(),
            placement: 1,
            prize_cents: 100,
        };
        let row = ResultRow {
            match_id: Uuid::from_u128(2),
            placement: &placement,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["placement"], 1);
        assert_eq!(json["display_name"], "ace");
        assert!(json.get("match_id").is_some());
    }
}
