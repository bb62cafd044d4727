//! Match money flow: entry fees in, prizes out

pub mod settlement;

pub use settlement::{SettlementEvent, SettlementService};
