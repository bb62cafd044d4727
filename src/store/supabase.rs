//! Supabase REST API client using service_role key

use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::Config;

/// Supabase client for server-side database operations
/// Uses service_role key which bypasses RLS - handle with care!
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(
            Client::new(),
            &config.supabase_url,
            &config.supabase_service_role_key,
        )
    }

    pub fn with_client(client: Client, base_url: &str, service_role_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key: service_role_key.to_string(),
        }
    }

    /// Get the REST API URL for a table
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    /// Attach the service-role credentials
    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .header("Content-Type", "application/json")
    }

    async fn check(response: Response) -> Result<Response, SupabaseError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api { status: status.as_u16(), body });
        }
        Ok(response)
    }

    /// Make an authenticated GET request expecting a single row
    pub async fn get_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Option<T>, SupabaseError> {
        let url = format!("{}?{}", self.rest_url(table), query);

        let response = self
            .authed(self.client.get(&url))
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await
            .map_err(SupabaseError::Request)?;

        if response.status() == reqwest::StatusCode::NOT_ACCEPTABLE {
            // No rows found
            return Ok(None);
        }

        Self::check(response)
            .await?
            .json()
            .await
            .map(Some)
            .map_err(SupabaseError::Parse)
    }

    /// Make an authenticated POST request (insert)
    pub async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        data: &T,
    ) -> Result<R, SupabaseError> {
        let url = self.rest_url(table);

        let response = self
            .authed(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(data)
            .send()
            .await
            .map_err(SupabaseError::Request)?;

        // PostgREST returns an array, get first element
        let results: Vec<R> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(SupabaseError::Parse)?;
        results
            .into_iter()
            .next()
            .ok_or(SupabaseError::NoRowReturned)
    }

    /// Bulk insert without reading rows back
    pub async fn insert_many<T: Serialize>(
        &self,
        table: &str,
        rows: &[T],
    ) -> Result<(), SupabaseError> {
        if rows.is_empty() {
            return Ok(());
        }
        let url = self.rest_url(table);

        let response = self
            .authed(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await
            .map_err(SupabaseError::Request)?;

        Self::check(response).await?;
        Ok(())
    }

    /// Call a Postgres function through PostgREST
    pub async fn rpc<T: Serialize, R: DeserializeOwned>(
        &self,
        function: &str,
        args: &T,
    ) -> Result<R, SupabaseError> {
        let response = self
            .authed(self.client.post(self.rpc_url(function)))
            .json(args)
            .send()
            .await
            .map_err(SupabaseError::Request)?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(SupabaseError::Parse)
    }

    /// Resolve a user access token through the auth API
    pub async fn auth_user<R: DeserializeOwned>(&self, access_token: &str) -> Result<R, SupabaseError> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(SupabaseError::Request)?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(SupabaseError::Parse)
    }
}

/// Supabase errors
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(reqwest::Error),

    #[error("No row returned from insert")]
    NoRowReturned,
}

impl SupabaseError {
    /// 4xx responses are the server refusing the request, not an outage
    pub fn is_client_error(&self) -> bool {
        matches!(self, SupabaseError::Api { status, .. } if (400..500).contains(status))
    }
}
