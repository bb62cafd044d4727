//! Token exchange: who is behind a `connect` message

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};
use uuid::Uuid;

use super::profiles::ProfileStore;
use super::supabase::{SupabaseClient, SupabaseError};

type HmacSha256 = Hmac<Sha256>;

/// An authenticated account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub display_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Identity service unavailable: {0}")]
    Upstream(String),
}

impl From<SupabaseError> for IdentityError {
    fn from(e: SupabaseError) -> Self {
        if e.is_client_error() {
            IdentityError::Unauthorized
        } else {
            IdentityError::Upstream(e.to_string())
        }
    }
}

/// Exchanges an opaque token for an identity
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<Identity, IdentityError>;
}

/// JWT claims from Supabase auth token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    #[serde(default)]
    pub aud: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    #[serde(default)]
    pub iat: u64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,

    #[error("Token expired")]
    Expired,
}

/// Verify an HS256 JWT and extract claims; `now` is a unix timestamp
pub fn verify_jwt(token: &str, secret: &str, now: u64) -> Result<JwtClaims, TokenError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Invalid);
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::Invalid)?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(payload_b64.as_bytes());

    let provided_signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| TokenError::Invalid)?;
    // Constant-time comparison
    mac.verify_slice(&provided_signature)
        .map_err(|_| TokenError::Invalid)?;

    let payload_json = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| TokenError::Invalid)?;
    let claims: JwtClaims =
        serde_json::from_slice(&payload_json).map_err(|_| TokenError::Invalid)?;

    if claims.exp < now {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

/// Verifies tokens locally with the project's JWT secret
pub struct JwtIdentity {
    secret: String,
    profiles: ProfileStore,
}

impl JwtIdentity {
    pub fn new(secret: String, profiles: ProfileStore) -> Self {
        Self { secret, profiles }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentity {
    async fn authenticate(&self, token: &str) -> Result<Identity, IdentityError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = verify_jwt(token, &self.secret, now).map_err(|e| {
            debug!(error = %e, "Rejected token");
            IdentityError::Unauthorized
        })?;

        let suggested = claims.email.as_deref().and_then(|e| e.split('@').next());
        let display_name = self
            .profiles
            .display_name(claims.sub, suggested)
            .await
            .map_err(|e| {
                warn!(user_id = %claims.sub, error = %e, "Profile lookup failed");
                IdentityError::Upstream(e.to_string())
            })?;

        Ok(Identity {
            user_id: claims.sub,
            display_name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    display_name: Option<String>,
}

/// Asks the auth service about each token
pub struct SupabaseIdentity {
    client: SupabaseClient,
    profiles: ProfileStore,
}

impl SupabaseIdentity {
    pub fn new(client: SupabaseClient, profiles: ProfileStore) -> Self {
        Self { client, profiles }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn authenticate(&self, token: &str) -> Result<Identity, IdentityError> {
        if token.trim().is_empty() {
            return Err(IdentityError::Unauthorized);
        }

        let user: AuthUser = self.client.auth_user(token).await?;
        let suggested = user
            .user_metadata
            .and_then(|m| m.display_name)
            .or_else(|| user.email.and_then(|e| e.split('@').next().map(str::to_string)));

        let display_name = self
            .profiles
            .display_name(user.id, suggested.as_deref())
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        Ok(Identity {
            user_id: user.id,
            display_name,
        })
    }
}
