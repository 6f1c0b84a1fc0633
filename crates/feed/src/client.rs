//! Authenticated access to the image and results endpoints.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Authenticator;
use crate::error::{FeedError, Result};
use crate::models::{ImageResponse, ResultsResponse};

/// Build the shared HTTP client used for auth and resource requests.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(client)
}

/// Fetches the paired resources with a bearer credential attached,
/// transparently refreshing the session once on an authorization failure.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    auth: Arc<Authenticator>,
}

impl ApiClient {
    pub fn new(client: Client, base_url: Url, auth: Arc<Authenticator>) -> Self {
        Self {
            client,
            base_url,
            auth,
        }
    }

    pub fn authenticator(&self) -> &Arc<Authenticator> {
        &self.auth
    }

    pub async fn fetch_image(&self) -> Result<ImageResponse> {
        self.get_with_refresh("/api/image", "fetch image").await
    }

    pub async fn fetch_results(&self) -> Result<ResultsResponse> {
        self.get_with_refresh("/api/results", "fetch results").await
    }

    /// Authenticated GET with a single refresh-and-retry on 401.
    ///
    /// A 401 on the first request triggers exactly one refresh; a refresh
    /// failure, or a 401 on the retried request, means the session is gone
    /// and surfaces as [`FeedError::SessionExpired`]. Any other non-success
    /// final status is propagated as [`FeedError::HttpStatus`].
    async fn get_with_refresh<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &'static str,
    ) -> Result<T> {
        let Some(token) = self.auth.access_token() else {
            return Err(FeedError::NotLoggedIn);
        };
        let url = self
            .base_url
            .join(path)
            .map_err(|e| FeedError::invalid_base_url(self.base_url.as_str(), e.to_string()))?;

        let mut response = self.authenticated_get(url.clone(), &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if !self.auth.refresh().await {
                return Err(FeedError::SessionExpired);
            }
            let Some(token) = self.auth.access_token() else {
                return Err(FeedError::SessionExpired);
            };
            debug!(operation, "Access token rejected, retrying once with refreshed token");
            response = self.authenticated_get(url, &token).await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                // A freshly refreshed token was rejected: the session is
                // unusable, keeping the pair around would only repeat this.
                self.auth.logout();
                return Err(FeedError::SessionExpired);
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus { status, operation });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| FeedError::malformed(operation, e.to_string()))
    }

    async fn authenticated_get(&self, url: Url, token: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;
        Ok(response)
    }
}
