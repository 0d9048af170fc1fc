//! OAuth access tokens for the Firebase admin REST APIs.
//!
//! Production deployments sign a service-account assertion and exchange it at
//! Google's token endpoint. The resulting token is cached and shared by every
//! request until it is close to expiring. Emulators and pre-issued tokens skip
//! the exchange entirely.

use crate::config::Config;
use crate::errors::AppError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Google issues hour-long tokens; refresh well before that.
const TOKEN_CACHE_TTL: Duration = Duration::from_secs(50 * 60);

/// Claims of the signed service-account assertion.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServiceAccountClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl ServiceAccountClaims {
    pub fn new(client_email: &str, token_uri: &str, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iss: client_email.to_string(),
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
            aud: token_uri.to_string(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Service-account state: signing key plus the cached token.
pub struct ServiceAccount {
    client: reqwest::Client,
    client_email: String,
    key: EncodingKey,
    token_uri: String,
    cache: Cache<(), String>,
}

/// Source of bearer tokens for Firestore and the identity provider.
#[derive(Clone)]
pub enum AccessTokenProvider {
    /// Fixed token (emulator `owner` token or an externally issued one).
    Static(String),
    /// Service-account exchange with a cached result.
    ServiceAccount(Arc<ServiceAccount>),
}

impl AccessTokenProvider {
    /// Creates the provider described by the configuration.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        if let Some(token) = &config.firebase_access_token {
            tracing::info!("Using static Firebase access token");
            return Ok(Self::Static(token.clone()));
        }

        let (Some(client_email), Some(private_key)) =
            (&config.firebase_client_email, &config.firebase_private_key)
        else {
            return Err(AppError::InternalError(
                "Service account credentials are not configured".to_string(),
            ));
        };

        let key = EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(|e| {
            AppError::InternalError(format!("Invalid service account private key: {}", e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create token client: {}", e))
            })?;

        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(TOKEN_CACHE_TTL)
            .build();

        tracing::info!("Using service account {} for Firebase access", client_email);
        Ok(Self::ServiceAccount(Arc::new(ServiceAccount {
            client,
            client_email: client_email.clone(),
            key,
            token_uri: config.google_token_uri.clone(),
            cache,
        })))
    }

    /// Returns a bearer token, exchanging credentials on first use.
    ///
    /// Concurrent callers share a single in-flight exchange.
    pub async fn access_token(&self) -> Result<String, AppError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::ServiceAccount(account) => {
                account
                    .cache
                    .try_get_with((), account.exchange())
                    .await
                    .map_err(|e| e.as_ref().clone())
            }
        }
    }
}

impl ServiceAccount {
    async fn exchange(&self) -> Result<String, AppError> {
        let claims = ServiceAccountClaims::new(&self.client_email, &self.token_uri, Utc::now());
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| AppError::InternalError(format!("Failed to sign assertion: {}", e)))?;

        tracing::debug!("Exchanging service account assertion at {}", self.token_uri);

        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Token endpoint returned {}: {}",
                status, error_text
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse token response: {}", e))
        })?;

        tracing::info!("✓ Obtained Firebase access token");
        Ok(token.access_token)
    }
}
