//! Game simulation modules

pub mod food;
pub mod leaderboard;
pub mod player;
pub mod runner;
pub mod snapshot;
pub mod world;
pub mod zone;

pub use runner::{Command, GameLoop, LoopStats};
pub use world::World;

use uuid::Uuid;

use crate::ws::protocol::ClientMsg;

/// Connection-scoped player id
pub type PlayerId = Uuid;

/// An authenticated player's request, routed into the game loop
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    JoinMatch { tier: u32 },
    CancelMatch,
    Move { x: f32, y: f32 },
    Boost { boosting: bool },
    Emoji { emoji: Option<String> },
    LeaderboardRequest,
}

impl PlayerCommand {
    /// Commands the game loop owns; `connect` and `profile_request` are
    /// handled by the connection itself
    pub fn from_client(msg: ClientMsg) -> Option<Self> {
        match msg {
            ClientMsg::JoinMatch { entry_fee } => Some(Self::JoinMatch { tier: entry_fee }),
            ClientMsg::MatchCancel => Some(Self::CancelMatch),
            ClientMsg::PlayerMove { x, y } => Some(Self::Move { x, y }),
            ClientMsg::PlayerBoost { boosting } => Some(Self::Boost { boosting }),
            ClientMsg::PlayerEmoji { emoji } => Some(Self::Emoji { emoji }),
            ClientMsg::LeaderboardRequest => Some(Self::LeaderboardRequest),
            ClientMsg::Connect { .. } | ClientMsg::ProfileRequest { .. } => None,
        }
    }
}
