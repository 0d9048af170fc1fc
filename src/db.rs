use crate::config::Config;
use crate::credentials::AccessTokenProvider;
use crate::documents::ListDocumentsResponse;
use crate::errors::AppError;
use crate::validation::is_dot_segment;
use serde_json::{Map, Value};
use std::time::Duration;

/// Documents requested per `documents.list` page.
const PAGE_SIZE: u32 = 300;

/// Administrative client for the Firestore REST API.
///
/// Constructed once at startup and shared through the application state.
#[derive(Clone)]
pub struct Database {
    client: reqwest::Client,
    documents_url: String,
    tokens: AccessTokenProvider,
}

impl Database {
    pub fn new(config: &Config, tokens: AccessTokenProvider) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Firestore client: {}", e))
            })?;

        Ok(Self {
            client,
            documents_url: format!(
                "{}/v1/projects/{}/databases/(default)/documents",
                config.firestore_base_url, config.firebase_project_id
            ),
            tokens,
        })
    }

    fn document_url(&self, segments: &[&str]) -> Result<reqwest::Url, AppError> {
        if let Some(segment) = segments.iter().find(|s| is_dot_segment(s)) {
            return Err(AppError::InternalError(format!(
                "'{}' is not a valid document path segment",
                segment
            )));
        }

        let mut url = reqwest::Url::parse(&self.documents_url)
            .map_err(|e| AppError::InternalError(format!("Invalid Firestore URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::InternalError("Firestore URL cannot be a base".to_string()))?
            .extend(segments);
        Ok(url)
    }

    /// Reads every document of a top-level collection, following pagination.
    ///
    /// Records come back in the order Firestore returns them, with the
    /// document identifier merged under `id`.
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Map<String, Value>>, AppError> {
        let token = self.tokens.access_token().await?;
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.document_url(&[collection])?;
            url.query_pairs_mut()
                .append_pair("pageSize", &PAGE_SIZE.to_string());
            if let Some(ref next) = page_token {
                url.query_pairs_mut().append_pair("pageToken", next);
            }

            tracing::debug!("Listing Firestore collection '{}'", collection);

            let response = self
                .client
                .get(url)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| AppError::ExternalApiError(format!("Firestore request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(AppError::ExternalApiError(format!(
                    "Firestore returned {} listing '{}': {}",
                    status, collection, error_text
                )));
            }

            let page: ListDocumentsResponse = response.json().await.map_err(|e| {
                AppError::ExternalApiError(format!("Failed to parse Firestore response: {}", e))
            })?;

            records.extend(page.documents.into_iter().map(|doc| doc.into_record()));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::info!(
            "Read {} document(s) from collection '{}'",
            records.len(),
            collection
        );
        Ok(records)
    }

    /// Deletes `collection/id`. Deleting a missing document succeeds.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppError> {
        let token = self.tokens.access_token().await?;
        let url = self.document_url(&[collection, id])?;

        tracing::info!("Deleting Firestore document {}/{}", collection, id);

        let response = self
            .client
            .delete(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Firestore request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Firestore returned {} deleting {}/{}: {}",
                status, collection, id, error_text
            )));
        }

        tracing::info!("✓ Deleted document {}/{}", collection, id);
        Ok(())
    }
}
