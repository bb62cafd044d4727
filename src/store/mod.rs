//! External collaborators: identity, ledger and match history over Supabase

pub mod history;
pub mod identity;
pub mod ledger;
#[cfg(test)]
pub mod memory;
pub mod profiles;
pub mod supabase;

use std::sync::Arc;

pub use history::{MatchHistory, MatchRecord, SupabaseHistory};
pub use identity::{IdentityProvider, JwtIdentity, SupabaseIdentity};
pub use ledger::{Ledger, LedgerEntry, LedgerError, LedgerReason, SupabaseLedger};
pub use profiles::ProfileStore;
pub use supabase::SupabaseClient;

use crate::config::Config;

/// Handles to every collaborator, shared by connections and settlement
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityProvider>,
    pub ledger: Arc<dyn Ledger>,
    pub history: Arc<dyn MatchHistory>,
}

impl Collaborators {
    /// Supabase-backed collaborators; local JWT checks when a secret is configured
    pub fn from_config(config: &Config) -> Self {
        let supabase = SupabaseClient::new(config);
        let profiles = ProfileStore::new(supabase.clone());

        let identity: Arc<dyn IdentityProvider> = match &config.supabase_jwt_secret {
            Some(secret) => Arc::new(JwtIdentity::new(secret.clone(), profiles)),
            None => Arc::new(SupabaseIdentity::new(supabase.clone(), profiles)),
        };

        Self {
            identity,
            ledger: Arc::new(SupabaseLedger::new(supabase.clone())),
            history: Arc::new(SupabaseHistory::new(supabase)),
        }
    }
}
