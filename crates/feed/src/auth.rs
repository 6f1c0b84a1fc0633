//! Authentication against the inference API.
//!
//! The authenticator owns the token pair: empty at start, populated on a
//! successful login, replaced on a successful refresh, cleared on logout or
//! a failed refresh. Login and refresh report success through a boolean so
//! callers can treat "not authenticated" as ordinary state rather than an
//! error path.

use parking_lot::RwLock;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FeedError, Result};
use crate::models::{LoginRequest, RefreshRequest, TokenResponse};

#[derive(Debug, Default)]
struct TokenPair {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Exchanges credentials for tokens and refreshes expired tokens.
pub struct Authenticator {
    client: Client,
    base_url: Url,
    tokens: RwLock<TokenPair>,
}

impl Authenticator {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            tokens: RwLock::new(TokenPair::default()),
        }
    }

    /// Exchange credentials for a token pair.
    ///
    /// Returns `false` on any network failure, non-success status, or
    /// malformed body, leaving the state unauthenticated.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        match self.request_login(username, password).await {
            Ok(tokens) => {
                self.store(tokens);
                debug!("Login succeeded");
                true
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                false
            }
        }
    }

    /// Trade the held refresh token for a fresh pair.
    ///
    /// Returns `false` without I/O when no refresh token is held. On any
    /// failure both tokens are cleared so a stale pair is never reused.
    pub async fn refresh(&self) -> bool {
        let Some(refresh_token) = self.tokens.read().refresh_token.clone() else {
            return false;
        };
        match self.request_refresh(&refresh_token).await {
            Ok(tokens) => {
                self.store(tokens);
                debug!("Token refresh succeeded");
                true
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                self.logout();
                false
            }
        }
    }

    /// Current access token, if any. Pure read, no I/O.
    pub fn access_token(&self) -> Option<String> {
        self.tokens.read().access_token.clone()
    }

    /// True iff an access token is currently held.
    pub fn is_logged_in(&self) -> bool {
        self.tokens.read().access_token.is_some()
    }

    /// Drop both tokens. Idempotent.
    pub fn logout(&self) {
        let mut tokens = self.tokens.write();
        tokens.access_token = None;
        tokens.refresh_token = None;
    }

    pub(crate) fn store(&self, response: TokenResponse) {
        let mut tokens = self.tokens.write();
        tokens.access_token = Some(response.access_token).filter(|t| !t.is_empty());
        tokens.refresh_token = Some(response.refresh_token).filter(|t| !t.is_empty());
    }

    async fn request_login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let url = self.endpoint("/api/auth/login")?;
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                status,
                operation: "login",
            });
        }
        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| FeedError::malformed("login", e.to_string()))
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let url = self.endpoint("/api/auth/refresh")?;
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                status,
                operation: "token refresh",
            });
        }
        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| FeedError::malformed("token refresh", e.to_string()))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| FeedError::invalid_base_url(self.base_url.as_str(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        Authenticator::new(Client::new(), base)
    }

    #[test]
    fn starts_logged_out() {
        let auth = authenticator();
        assert!(!auth.is_logged_in());
        assert!(auth.access_token().is_none());
    }

    #[test]
    fn logout_is_idempotent() {
        let auth = authenticator();
        auth.logout();
        auth.logout();
        assert!(!auth.is_logged_in());
    }

    #[tokio::test]
    async fn refresh_without_token_is_a_local_no_op() {
        // Port 9 (discard) is never dialed: the missing refresh token
        // short-circuits before any request is built.
        let auth = authenticator();
        assert!(!auth.refresh().await);
        assert!(!auth.is_logged_in());
    }

    #[test]
    fn empty_tokens_do_not_count_as_logged_in() {
        let auth = authenticator();
        auth.store(TokenResponse {
            access_token: String::new(),
            refresh_token: String::new(),
        });
        assert!(!auth.is_logged_in());
    }
}
