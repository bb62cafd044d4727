//! Application state shared across routes, and the background workers behind it

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::game::zone::ZoneConfigError;
use crate::game::{Command, GameLoop, LoopStats, World};
use crate::payments::{SettlementEvent, SettlementService};
use crate::store::Collaborators;

/// Pending commands from all connections into the game loop
const COMMAND_BUFFER: usize = 4096;
const SETTLEMENT_BUFFER: usize = 256;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub commands: mpsc::Sender<Command>,
    pub stats: Arc<LoopStats>,
    pub services: Collaborators,
}

/// Tasks that must be spawned for the state to be served
pub struct Workers {
    pub game: GameLoop,
    pub settlement: SettlementService,
    settlement_rx: mpsc::Receiver<SettlementEvent>,
}

impl Workers {
    pub fn spawn(self) -> (JoinHandle<()>, JoinHandle<()>) {
        let game = tokio::spawn(self.game.run());
        let settlement = tokio::spawn(self.settlement.run(self.settlement_rx));
        (game, settlement)
    }
}

impl AppState {
    pub fn new(config: Config, services: Collaborators) -> Result<(Self, Workers), ZoneConfigError> {
        let config = Arc::new(config);

        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (settlement_tx, settlement_rx) = mpsc::channel(SETTLEMENT_BUFFER);
        let stats = Arc::new(LoopStats::default());

        let world = World::new(config.game.clone())?;
        let game = GameLoop::new(
            world,
            config.game.tick_rate,
            commands_rx,
            settlement_tx,
            stats.clone(),
        );
        let settlement = SettlementService::new(services.ledger.clone(), services.history.clone());

        let state = Self {
            config,
            commands: commands_tx,
            stats,
            services,
        };
        let workers = Workers {
            game,
            settlement,
            settlement_rx,
        };

        Ok((state, workers))
    }
}
