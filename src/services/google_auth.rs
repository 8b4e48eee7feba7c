// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth access tokens for Google APIs.
//!
//! Service-account keys are exchanged for access tokens with the JWT bearer
//! grant (RFC 7523). Tokens are cached until shortly before they expire.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Errors obtaining an access token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Failed to read service account key: {0}")]
    KeyFile(String),

    #[error("Invalid service account key: {0}")]
    InvalidKey(String),

    #[error("Token exchange failed: {0}")]
    Exchange(String),
}

/// The fields of a service-account key file that the grant needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AuthError::KeyFile(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        serde_json::from_str(json).map_err(|e| AuthError::InvalidKey(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Where bearer tokens for the Sheets API come from.
pub enum AccessTokenSource {
    /// A fixed token, typically for local fakes or short-lived debugging.
    Static(String),
    ServiceAccount(ServiceAccountTokenSource),
}

impl AccessTokenSource {
    pub async fn token(&self) -> Result<String, AuthError> {
        match self {
            AccessTokenSource::Static(token) => Ok(token.clone()),
            AccessTokenSource::ServiceAccount(source) => source.token().await,
        }
    }
}

/// Exchanges a service-account key for cached access tokens.
pub struct ServiceAccountTokenSource {
    http_client: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    cache: RwLock<Option<CachedToken>>,
    refresh_lock: Mutex<()>,
}

impl ServiceAccountTokenSource {
    pub fn new(
        http_client: reqwest::Client,
        key: ServiceAccountKey,
        scope: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AuthError::InvalidKey(format!("private_key: {}", e)))?;

        Ok(Self {
            http_client,
            key,
            encoding_key,
            scope: scope.into(),
            cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// A valid access token, refreshed if the cached one is about to expire.
    pub async fn token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        // One refresh at a time; later waiters pick up the fresh token.
        let _guard = self.refresh_lock.lock().await;
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *self.cache.write().await = Some(fresh);
        Ok(token)
    }

    async fn cached(&self) -> Option<String> {
        self.cache
            .read()
            .await
            .as_ref()
            .filter(|c| Instant::now() < c.refresh_at)
            .map(|c| c.token.clone())
    }

    async fn exchange(&self) -> Result<CachedToken, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AuthError::Exchange(format!("system clock before epoch: {}", e)))?
            .as_secs();

        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidKey(format!("signing assertion: {}", e)))?;

        let response = self
            .http_client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Exchange(format!("HTTP {}: {}", status, body)));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("JSON parse error: {}", e)))?;

        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(EXPIRY_MARGIN);
        tracing::info!(
            client_email = %self.key.client_email,
            expires_in = body.expires_in,
            "Obtained Google access token"
        );

        Ok(CachedToken {
            token: body.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}
