//! Entry-fee debits, prize credits and match history, off the game loop

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::matchmaking::{Match, MatchOutcome};
use crate::store::{Ledger, LedgerEntry, LedgerError, LedgerReason, MatchHistory, MatchRecord};

/// Stake units are whole currency; the ledger counts cents
pub const CENTS_PER_UNIT: i64 = 100;

/// Money-relevant transitions published by the game loop
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementEvent {
    MatchFormed(Match),
    MatchCompleted(MatchOutcome),
}

/// Applies settlement events to the ledger and history, one at a time
pub struct SettlementService {
    ledger: Arc<dyn Ledger>,
    history: Arc<dyn MatchHistory>,
}

impl SettlementService {
    pub fn new(ledger: Arc<dyn Ledger>, history: Arc<dyn MatchHistory>) -> Self {
        Self { ledger, history }
    }

    /// Consume events until the game loop drops its sender
    pub async fn run(self, mut events: mpsc::Receiver<SettlementEvent>) {
        info!("Settlement worker started");
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        info!("Settlement worker stopped");
    }

    pub async fn handle(&self, event: SettlementEvent) {
        match event {
            SettlementEvent::MatchFormed(record) => self.collect_entry_fees(&record).await,
            SettlementEvent::MatchCompleted(outcome) => self.pay_out(&outcome).await,
        }
    }

    async fn collect_entry_fees(&self, record: &Match) {
        let fee = record.tier as i64 * CENTS_PER_UNIT;
        for player in record.participants() {
            let entry = LedgerEntry::for_match(record.id, player.user_id, -fee, LedgerReason::EntryFee);
            match self.ledger.apply(entry).await {
                Ok(balance) => {
                    info!(match_id = %record.id, user_id = %player.user_id, fee, balance, "Entry fee debited");
                }
                Err(LedgerError::InsufficientFunds) => {
                    warn!(match_id = %record.id, user_id = %player.user_id, fee, "Entry fee not covered");
                }
                Err(e) => {
                    error!(match_id = %record.id, user_id = %player.user_id, error = %e, "Entry fee debit failed");
                }
            }
        }
    }

    async fn pay_out(&self, outcome: &MatchOutcome) {
        let match_id = outcome.record.id;
        let prize = match &outcome.winner {
            Some(winner) => {
                let prize = outcome.record.prize_pool() as i64 * CENTS_PER_UNIT;
                let entry = LedgerEntry::for_match(match_id, winner.user_id, prize, LedgerReason::Prize);
                match self.ledger.apply(entry).await {
                    Ok(balance) => {
                        info!(match_id = %match_id, user_id = %winner.user_id, prize, balance, "Prize credited");
                    }
                    Err(e) => {
                        error!(match_id = %match_id, user_id = %winner.user_id, error = %e, "Prize credit failed");
                    }
                }
                prize
            }
            None => {
                warn!(match_id = %match_id, "Match ended without a winner, no prize paid");
                0
            }
        };

        if let Err(e) = self
            .history
            .record_match(MatchRecord::from_outcome(outcome, prize))
            .await
        {
            error!(match_id = %match_id, error = %e, "Failed to record match");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchmaking::queue::QueuedPlayer;
    use crate::matchmaking::ActiveMatches;
    use crate::store::memory::{MemoryHistory, MemoryLedger};
    use std::time::Duration;
    use uuid::Uuid;

    fn user(n: u128) -> Uuid {
        Uuid::from_u128(n + 100)
    }

    fn record(tier: u32, n: u128) -> Match {
        let players = (1..=n)
            .map(|i| QueuedPlayer {
                player_id: Uuid::from_u128(i),
                user_id: user(i),
                display_name: format!("p{i}"),
                queued_at: Duration::ZERO,
            })
            .collect();
        Match::form(tier, players, 0)
    }

    fn service(ledger: MemoryLedger, history: MemoryHistory) -> (SettlementService, Arc<MemoryLedger>, Arc<MemoryHistory>) {
        let ledger = Arc::new(ledger);
        let history = Arc::new(history);
        (
            SettlementService::new(ledger.clone(), history.clone()),
            ledger,
            history,
        )
    }

    #[tokio::test]
    async fn formation_debits_every_participant_once() {
        let ledger = MemoryLedger::default()
            .with_balance(user(1), 1_000)
            .with_balance(user(2), 1_000);
        let (service, ledger, _) = service(ledger, MemoryHistory::default());
        let record = record(5, 2);

        service.handle(SettlementEvent::MatchFormed(record.clone())).await;
        // A replay is absorbed by the idempotency key
        service.handle(SettlementEvent::MatchFormed(record.clone())).await;

        assert_eq!(ledger.balance_of(user(1)), 500);
        assert_eq!(ledger.balance_of(user(2)), 500);
        let keys: Vec<String> = ledger.applied().into_iter().map(|e| e.idempotency_key).collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], format!("{}:{}:entry", record.id, user(1)));
    }

    #[tokio::test]
    async fn uncovered_fee_does_not_stop_other_debits() {
        let ledger = MemoryLedger::default().with_balance(user(2), 100);
        let (service, ledger, _) = service(ledger, MemoryHistory::default());

        service.handle(SettlementEvent::MatchFormed(record(1, 2))).await;
        assert_eq!(ledger.balance_of(user(1)), 0);
        assert_eq!(ledger.balance_of(user(2)), 0);
        assert_eq!(ledger.applied().len(), 1);
    }

    #[tokio::test]
    async fn completion_credits_winner_and_records_history() {
        let (service, ledger, history) = service(MemoryLedger::default(), MemoryHistory::default());
        let mut active = ActiveMatches::new();
        let formed = record(20, 3);
        let match_id = formed.id;
        active.start(formed);
        active.player_out(&Uuid::from_u128(1), 10);
        let outcome = active.player_out(&Uuid::from_u128(3), 20).unwrap();

        service.handle(SettlementEvent::MatchCompleted(outcome)).await;

        assert_eq!(ledger.balance_of(user(2)), 6_000);
        let records = history.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].match_id, match_id);
        assert_eq!(records[0].winner_user_id, Some(user(2)));
        assert_eq!(records[0].placements[0].prize_cents, 6_000);
    }

    #[tokio::test]
    async fn history_outage_is_logged_not_fatal() {
        let (service, ledger, _) = service(MemoryLedger::default(), MemoryHistory::unavailable());
        let mut active = ActiveMatches::new();
        active.start(record(1, 2));
        let outcome = active.player_out(&Uuid::from_u128(1), 0).unwrap();

        service.handle(SettlementEvent::MatchCompleted(outcome)).await;
        assert_eq!(ledger.balance_of(user(2)), 200);
    }

    #[tokio::test]
    async fn run_drains_until_sender_dropped() {
        let (service, ledger, _) = service(
            MemoryLedger::default().with_balance(user(1), 500).with_balance(user(2), 500),
            MemoryHistory::default(),
        );
        let (tx, rx) = mpsc::channel(4);
        tokio_test::assert_ok!(tx.send(SettlementEvent::MatchFormed(record(1, 2))).await);
        drop(tx);

        service.run(rx).await;
        assert_eq!(ledger.applied().len(), 2);
    }
}
