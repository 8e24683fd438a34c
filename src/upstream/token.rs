use crate::config::UpstreamCredentials;
use crate::error::UpstreamError;
use crate::upstream::dto::TokenResponse;
use tokio::sync::RwLock;

/// Fixed Basic-auth client credentials the STS host expects for the
/// password grant (`client_marketdata_api:client_marketdata_api`).
const STATIC_BASIC_AUTH: &str = "Basic Y2xpZW50X21hcmtldGRhdGFfYXBpOmNsaWVudF9tYXJrZXRkYXRhX2FwaQ==";

/// Holds the current bearer token in memory and knows how to refresh it.
/// One instance per process; never a global.
pub struct TokenManager {
    token_url: String,
    credentials: UpstreamCredentials,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl TokenManager {
    pub fn new(token_url: String, credentials: UpstreamCredentials, http: reqwest::Client) -> Self {
        Self {
            token_url,
            credentials,
            http,
            token: RwLock::new(None),
        }
    }

    /// Current token, refreshing first if none has been acquired yet.
    pub async fn token(&self) -> Result<String, UpstreamError> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.refresh().await
    }

    /// Acquire a fresh token and store it in memory.
    pub async fn refresh(&self) -> Result<String, UpstreamError> {
        if !self.credentials.is_configured() {
            return Err(UpstreamError::MissingCredentials);
        }

        let form = [
            ("grant_type", "password"),
            ("scope", "marketdata_api"),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .header("Authorization", STATIC_BASIC_AUTH)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(&form)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::RateLimitOrClientError { status, body });
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        *self.token.write().await = Some(parsed.access_token.clone());
        Ok(parsed.access_token)
    }
}
