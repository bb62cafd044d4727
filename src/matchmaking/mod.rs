//! Matchmaking: tier queues, match formation and active match tracking

pub mod matches;
pub mod queue;
pub mod service;

pub use matches::{ActiveMatches, Match, MatchOutcome};
pub use service::{JoinOutcome, LobbyStatus, MatchmakingService, QueueError, QueueEvent};
