//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMsg {
    /// Authenticate this connection; the only message accepted before auth
    Connect { token: String },

    /// Queue for a match under an entry-fee tier
    JoinMatch { entry_fee: u32 },

    /// Leave whatever queue this player is in
    MatchCancel,

    /// Steer towards a world-space point
    PlayerMove { x: f32, y: f32 },

    PlayerBoost { boosting: bool },

    /// Set or clear (`null`) the cosmetic marker
    PlayerEmoji { emoji: Option<String> },

    LeaderboardRequest,

    /// Look up another user's persisted statistics
    ProfileRequest { user_id: Uuid },
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMsg {
    /// Authentication accepted
    ConnectSuccess {
        user_id: Uuid,
        /// Connection-scoped id of this player's entity
        player_id: Uuid,
        username: String,
        /// Wallet balance in cents
        wallet_balance: i64,
    },

    /// Authentication rejected; the connection stays open and unauthenticated
    ConnectError { error: String },

    /// Lobby state for one tier
    LobbyUpdate {
        tier: u32,
        queued: usize,
        /// queued × tier stake
        prize_pool: u64,
        /// Whole seconds until the match forms, when a countdown is running
        #[serde(skip_serializing_if = "Option::is_none", default)]
        countdown: Option<u32>,
    },

    /// A match formed; sent to its participants only
    MatchFound {
        match_id: Uuid,
        tier: u32,
        players: Vec<MatchPlayerInfo>,
    },

    /// At most one participant of the match is still standing
    MatchEnded {
        match_id: Uuid,
        winner_id: Option<Uuid>,
        prize_pool: u64,
    },

    /// Full world snapshot
    GameState {
        players: Vec<PlayerView>,
        foods: Vec<FoodView>,
        zone: ZoneView,
    },

    PlayerUpdate { player: PlayerView },

    /// Player eliminated
    PlayerDeath { player_id: Uuid },

    ZoneUpdate { zone: ZoneView },

    LeaderboardUpdate { leaderboard: Vec<LeaderboardEntry> },

    /// Reply to `profile_request`; `stats` is absent for users with no history
    ProfileData {
        user_id: Uuid,
        stats: Option<ProfileStats>,
    },

    Error { message: String },
}

/// Participant listing in `match_found`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPlayerInfo {
    pub player_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
}

/// Player state as seen by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: Uuid,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub health: f32,
    pub boosting: bool,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub emoji: Option<String>,
}

/// Food pellet as seen by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodView {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Safe zone as seen by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneView {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    /// 1-based stage index
    pub stage: u32,
    pub damage_per_second: f32,
    /// Seconds until the next stage transition
    pub next_stage_in: f32,
}

/// One ranked row of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based
    pub rank: u32,
    pub player_id: Uuid,
    pub name: String,
    pub size: f32,
}

/// Persisted per-user statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub matches_played: u32,
    pub wins: u32,
    pub total_prize_cents: i64,
}
