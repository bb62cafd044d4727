//! In-memory collaborators for tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::ws::protocol::ProfileStats;

use super::history::{HistoryError, MatchHistory, MatchRecord};
use super::identity::{Identity, IdentityError, IdentityProvider};
use super::ledger::{Ledger, LedgerEntry, LedgerError};
use super::supabase::SupabaseError;

/// Accepts exactly the tokens it was given
#[derive(Default)]
pub struct MemoryIdentity {
    tokens: HashMap<String, Identity>,
}

impl MemoryIdentity {
    pub fn with_user(mut self, token: &str, user_id: Uuid, display_name: &str) -> Self {
        self.tokens.insert(
            token.to_string(),
            Identity {
                user_id,
                display_name: display_name.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn authenticate(&self, token: &str) -> Result<Identity, IdentityError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(IdentityError::Unauthorized)
    }
}

/// Balances plus the set of applied idempotency keys
#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    balances: HashMap<Uuid, i64>,
    applied: Vec<LedgerEntry>,
}

impl MemoryLedger {
    pub fn with_balance(self, user_id: Uuid, cents: i64) -> Self {
        self.state.lock().unwrap().balances.insert(user_id, cents);
        self
    }

    pub fn applied(&self) -> Vec<LedgerEntry> {
        self.state.lock().unwrap().applied.clone()
    }

    pub fn balance_of(&self, user_id: Uuid) -> i64 {
        self.state.lock().unwrap().balances.get(&user_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn balance(&self, user_id: Uuid) -> Result<i64, LedgerError> {
        Ok(self.balance_of(user_id))
    }

    async fn apply(&self, entry: LedgerEntry) -> Result<i64, LedgerError> {
        let mut state = self.state.lock().unwrap();
        let current = state.balances.get(&entry.user_id).copied().unwrap_or(0);
        if state.applied.iter().any(|e| e.idempotency_key == entry.idempotency_key) {
            return Ok(current);
        }
        let next = current + entry.amount_cents;
        if next < 0 {
            return Err(LedgerError::InsufficientFunds);
        }
        state.balances.insert(entry.user_id, next);
        state.applied.push(entry);
        Ok(next)
    }
}

#[derive(Default)]
pub struct MemoryHistory {
    records: Mutex<Vec<MatchRecord>>,
    stats: HashMap<Uuid, ProfileStats>,
    /// Fail every call, to exercise error paths
    unavailable: bool,
}

impl MemoryHistory {
    pub fn with_stats(mut self, user_id: Uuid, stats: ProfileStats) -> Self {
        self.stats.insert(user_id, stats);
        self
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<MatchRecord> {
        self.records.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), HistoryError> {
        if self.unavailable {
            return Err(HistoryError::Upstream(SupabaseError::Api {
                status: 503,
                body: "unavailable".into(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl MatchHistory for MemoryHistory {
    async fn record_match(&self, record: MatchRecord) -> Result<(), HistoryError> {
        self.check()?;
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    async fn player_stats(&self, user_id: Uuid) -> Result<Option<ProfileStats>, HistoryError> {
        self.check()?;
        Ok(self.stats.get(&user_id).cloned())
    }
}
