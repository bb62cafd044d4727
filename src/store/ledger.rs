//! Wallet balances and idempotent entry-fee/prize postings

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{SupabaseClient, SupabaseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerReason {
    EntryFee,
    Prize,
}

impl LedgerReason {
    pub fn key_suffix(self) -> &'static str {
        match self {
            LedgerReason::EntryFee => "entry",
            LedgerReason::Prize => "prize",
        }
    }
}

/// One posting; debits carry a negative amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub reason: LedgerReason,
    /// Replays with the same key are applied at most once
    pub idempotency_key: String,
}

impl LedgerEntry {
    pub fn for_match(match_id: Uuid, user_id: Uuid, amount_cents: i64, reason: LedgerReason) -> Self {
        Self {
            user_id,
            amount_cents,
            reason,
            idempotency_key: format!("{}:{}:{}", match_id, user_id, reason.key_suffix()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Ledger rejected entry: {0}")]
    Rejected(String),

    #[error("Ledger unavailable: {0}")]
    Upstream(String),
}

impl From<SupabaseError> for LedgerError {
    fn from(e: SupabaseError) -> Self {
        match e {
            SupabaseError::Api { body, .. } if body.contains("insufficient_funds") => {
                LedgerError::InsufficientFunds
            }
            SupabaseError::Api { status, body } if (400..500).contains(&status) => {
                LedgerError::Rejected(body)
            }
            other => LedgerError::Upstream(other.to_string()),
        }
    }
}

/// Balance in cents per user
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn balance(&self, user_id: Uuid) -> Result<i64, LedgerError>;

    /// Apply an entry and return the new balance
    async fn apply(&self, entry: LedgerEntry) -> Result<i64, LedgerError>;
}

#[derive(Debug, Deserialize)]
struct WalletRow {
    balance_cents: i64,
}

#[derive(Debug, Serialize)]
struct ApplyArgs<'a> {
    p_user_id: Uuid,
    p_amount_cents: i64,
    p_reason: LedgerReason,
    p_idempotency_key: &'a str,
}

pub struct SupabaseLedger {
    client: SupabaseClient,
}

impl SupabaseLedger {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Ledger for SupabaseLedger {
    async fn balance(&self, user_id: Uuid) -> Result<i64, LedgerError> {
        let query = format!("user_id=eq.{}&select=balance_cents", user_id);
        let row: Option<WalletRow> = self.client.get_one("wallets", &query).await?;
        Ok(row.map(|r| r.balance_cents).unwrap_or(0))
    }

    async fn apply(&self, entry: LedgerEntry) -> Result<i64, LedgerError> {
        let args = ApplyArgs {
            p_user_id: entry.user_id,
            p_amount_cents: entry.amount_cents,
            p_reason: entry.reason,
            p_idempotency_key: &entry.idempotency_key,
        };
        Ok(self.client.rpc("apply_ledger_entry", &args).await?)
    }
}
