use crate::error::UpstreamError;
use crate::upstream::token::TokenManager;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Thin HTTP client wrapping token lifecycle, 401-refresh-and-retry, and
/// exponential-backoff retry on transport errors / 5xx.
pub struct UpstreamClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<TokenManager>,
}

impl UpstreamClient {
    pub fn new(base_url: String, http: reqwest::Client, tokens: Arc<TokenManager>) -> Self {
        Self { base_url, http, tokens }
    }

    /// `GET` (or other method) `path` with query `params`, attaching the
    /// bearer token, refreshing once on 401, and retrying transport
    /// errors / 5xx with exponential backoff up to [`MAX_RETRIES`].
    pub async fn do_request(
        &self,
        method: reqwest::Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, UpstreamError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'));
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 0u32;
        let mut refreshed_after_401 = false;

        loop {
            let token = self.tokens.token().await?;
            let result = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(token)
                .query(params)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::UNAUTHORIZED {
                        if refreshed_after_401 {
                            return Err(UpstreamError::AuthExpired(
                                "token refresh did not clear 401".to_string(),
                            ));
                        }
                        refreshed_after_401 = true;
                        self.tokens.refresh().await?;
                        continue;
                    }

                    if status.is_success() {
                        return response
                            .json()
                            .await
                            .map_err(|e| UpstreamError::Parse(e.to_string()));
                    }

                    if status.is_server_error() {
                        attempt += 1;
                        if attempt > MAX_RETRIES {
                            return Err(UpstreamError::Transport(format!(
                                "exhausted retries, last status {status}"
                            )));
                        }
                        tokio::time::sleep(backoff).await;
                        backoff = (backoff * 2).min(MAX_BACKOFF);
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(UpstreamError::RateLimitOrClientError {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(e) => {
                    attempt += 1;
                    if attempt > MAX_RETRIES {
                        return Err(UpstreamError::Transport(e.to_string()));
                    }
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }
}
