//! Blocking-style page fetcher: GET with timeout, User-Agent, and
//! exponential-backoff retries on transport failures.

use std::time::Duration;

use reqwest::Client;

use crate::error::{Error, NetworkCause, Result};

const CONNECT_TIMEOUT_SECS: u64 = 10;

// The provider serves browser traffic; a bot-looking agent gets blocked.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug)]
pub(crate) struct Fetcher {
    http: Client,
    /// Additional attempts after the first failure.
    max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base_ms * 2^attempt`.
    backoff_base_ms: u64,
}

impl Fetcher {
    pub(crate) fn new(timeout_secs: u64, max_retries: u32, backoff_base_ms: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| Error::Network {
                url: "(client construction)".to_string(),
                attempts: 0,
                source: NetworkCause::Transport(source),
            })?;
        Ok(Self {
            http,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches `url` and returns the body.
    ///
    /// Any transport failure or non-2xx status is retried with exponential
    /// backoff up to `max_retries` additional attempts; the last cause is
    /// surfaced as [`Error::Network`] once the budget is spent.
    pub(crate) async fn get(&self, url: &str) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            match self.try_get(url).await {
                Ok(body) => {
                    tracing::debug!(url, bytes = body.len(), "fetched page");
                    return Ok(body);
                }
                Err(cause) if attempt < self.max_retries => {
                    let delay_ms = self.backoff_base_ms.saturating_mul(1 << attempt.min(20));
                    tracing::warn!(
                        url,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms,
                        error = %cause,
                        "transient fetch failure, retrying after backoff"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    attempt += 1;
                }
                Err(cause) => {
                    return Err(Error::Network {
                        url: url.to_string(),
                        attempts: attempt + 1,
                        source: cause,
                    });
                }
            }
        }
    }

    async fn try_get(&self, url: &str) -> std::result::Result<String, NetworkCause> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkCause::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
