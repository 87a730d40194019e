//! reqwest implementation of [`OffersApi`].

use reqwest::{Client, Response};

use super::OffersApi;
use super::dto::{BackendError, CreatedOffer};
use crate::config::ConsoleConfig;
use crate::domain::{Award, Offer, OfferDraft, OfferId};
use crate::error::ApiError;

/// HTTP client for the offers REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] shares its connection
/// pool.
#[derive(Debug, Clone)]
pub struct HttpOffersClient {
    http: Client,
    base_url: String,
}

impl HttpOffersClient {
    /// Builds a client for `config.api_url` with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: &ConsoleConfig) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.http_timeout()).build()?;
        Ok(Self::with_client(http, &config.api_url))
    }

    /// Wraps an existing [`reqwest::Client`].
    #[must_use]
    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base address requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl OffersApi for HttpOffersClient {
    async fn list_offers(&self) -> Result<Vec<Offer>, ApiError> {
        let response = self.http.get(self.url("/offers")).send().await?;
        let body = check_status(response).await?.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn create_offer(&self, draft: &OfferDraft) -> Result<Option<OfferId>, ApiError> {
        let response = self
            .http
            .post(self.url("/offers"))
            .json(draft)
            .send()
            .await?;
        let body = check_status(response).await?.bytes().await?;
        // The id is informational; the registry refreshes after a create.
        Ok(serde_json::from_slice::<CreatedOffer>(&body)
            .ok()
            .and_then(|created| created.id))
    }

    async fn update_offer(&self, id: OfferId, draft: &OfferDraft) -> Result<(), ApiError> {
        let response = self
            .http
            .put(self.url(&format!("/offers/{id}")))
            .json(draft)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn recent_awards(&self, limit: usize) -> Result<Vec<Award>, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/awards?limit={limit}")))
            .send()
            .await?;
        let body = check_status(response).await?.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

/// Passes success responses through and turns anything else into
/// [`ApiError::Status`], tracing the backend's error message if it sent one.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let detail = response
        .json::<BackendError>()
        .await
        .map(|body| body.error)
        .unwrap_or_default();
    tracing::debug!(%status, %url, %detail, "offers backend rejected request");
    Err(ApiError::Status(status))
}
