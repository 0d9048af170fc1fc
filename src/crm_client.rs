use crate::config::Config;
use crate::errors::AppError;
use crate::validation::is_dot_segment;
use serde_json::Value;
use std::time::Duration;

/// Client for the CRM lead API.
///
/// Lookups and searches return `Ok(None)` when the CRM answers without a
/// usable record (non-success status, `204 No Content`, empty body). Only
/// transport and decoding failures surface as errors.
#[derive(Clone)]
pub struct CrmClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl CrmClient {
    /// Creates a new `CrmClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the CRM API.
    /// * `token` - The API token for authentication.
    pub fn new(base_url: String, token: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create CRM client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(config.crm_base_url.clone(), config.crm_token.clone())
    }

    /// Gets a lead by identifier.
    ///
    /// # Arguments
    ///
    /// * `lead_id` - The ID of the lead to fetch.
    ///
    /// # Returns
    ///
    /// * `Result<Option<Value>, AppError>` - The lead record, or `None` when the CRM had nothing.
    pub async fn get_lead(&self, lead_id: &str) -> Result<Option<Value>, AppError> {
        if is_dot_segment(lead_id) {
            tracing::warn!("Lead id '{}' cannot address a lead", lead_id);
            return Ok(None);
        }

        let mut url = self.leads_url()?;
        url.path_segments_mut()
            .map_err(|_| AppError::InternalError("CRM URL cannot be a base".to_string()))?
            .push(lead_id);

        tracing::info!("Fetching lead {} from CRM", lead_id);
        self.fetch_optional(url).await
    }

    /// Searches leads by free-text query.
    ///
    /// # Arguments
    ///
    /// * `query` - Search text forwarded verbatim.
    ///
    /// # Returns
    ///
    /// * `Result<Option<Value>, AppError>` - The raw search payload, or `None` when the CRM had nothing.
    pub async fn search_leads(&self, query: &str) -> Result<Option<Value>, AppError> {
        let mut url = self.leads_url()?;
        url.query_pairs_mut().append_pair("query", query);

        tracing::info!("Searching CRM leads for '{}'", query);
        self.fetch_optional(url).await
    }

    fn leads_url(&self) -> Result<reqwest::Url, AppError> {
        reqwest::Url::parse(&format!("{}/api/v4/leads", self.base_url))
            .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))
    }

    async fn fetch_optional(&self, url: reqwest::Url) -> Result<Option<Value>, AppError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("CRM request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("CRM returned {}: {}", status, error_text);
            return Ok(None);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Failed to read CRM response: {}", e)))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!("CRM returned {} with an empty body", status);
            return Ok(None);
        }

        let data: Value = serde_json::from_slice(&body).map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse CRM response: {}", e))
        })?;

        Ok((!data.is_null()).then_some(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = CrmClient::new("https://example.com/".to_string(), "token".to_string());
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url, "https://example.com");
    }

    #[test]
    fn test_lead_ids_are_path_encoded() {
        let client = CrmClient::new("https://crm.example.com".to_string(), "t".to_string()).unwrap();
        let mut url = client.leads_url().unwrap();
        url.path_segments_mut().unwrap().push("a/b");

        assert_eq!(url.as_str(), "https://crm.example.com/api/v4/leads/a%2Fb");
    }

    #[tokio::test]
    async fn test_dot_lead_ids_never_reach_the_crm() {
        // Port 1 refuses connections, so any request would surface as an error.
        let client = CrmClient::new("http://127.0.0.1:1".to_string(), "t".to_string()).unwrap();

        assert!(client.get_lead("..").await.unwrap().is_none());
        assert!(client.get_lead(".").await.unwrap().is_none());
    }
}
