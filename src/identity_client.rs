use crate::config::Config;
use crate::credentials::AccessTokenProvider;
use crate::errors::AppError;
use serde_json::json;
use std::time::Duration;

/// Error code the identity provider returns for an unknown account.
const USER_NOT_FOUND: &str = "USER_NOT_FOUND";

/// Client for the Firebase Authentication admin API.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    accounts_url: String,
    tokens: AccessTokenProvider,
}

impl IdentityClient {
    pub fn new(config: &Config, tokens: AccessTokenProvider) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create identity client: {}", e))
            })?;

        Ok(Self {
            client,
            accounts_url: format!(
                "{}/v1/projects/{}/accounts",
                config.identity_base_url, config.firebase_project_id
            ),
            tokens,
        })
    }

    /// Deletes the account identified by `uid`.
    ///
    /// # Returns
    ///
    /// * `Err(AppError::UserNotFound)` - no account exists for `uid`.
    /// * `Err(AppError::ExternalApiError)` - any other failure.
    pub async fn delete_user(&self, uid: &str) -> Result<(), AppError> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}:delete", self.accounts_url);
        tracing::info!("Deleting identity account {}", uid);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "localId": uid }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Identity request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if error_code(&error_text).is_some_and(|code| code.starts_with(USER_NOT_FOUND)) {
                return Err(AppError::UserNotFound(uid.to_string()));
            }

            return Err(AppError::ExternalApiError(format!(
                "Identity provider returned {}: {}",
                status, error_text
            )));
        }

        tracing::info!("✓ Identity account {} deleted", uid);
        Ok(())
    }
}

/// Extracts `error.message` from an identity-provider error body.
///
/// The message is a code optionally followed by ` : detail`.
fn error_code(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|m| m.trim().to_string())
}
