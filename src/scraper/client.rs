//! Blocking HTTP client with an optional delay between requests. One GET per call, no retries.

use crate::scraper::{PageFetcher, ScraperError};
use reqwest::Url;
use std::time::{Duration, Instant};
use tracing::debug;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; chapterpull/0.1; +https://github.com/chapterpull)";

/// Blocking HTTP client that enforces a delay between requests.
#[derive(Debug)]
pub struct PoliteClient {
    inner: reqwest::blocking::Client,
    delay: Duration,
    last_request: Option<Instant>,
}

impl PoliteClient {
    /// Build a client with the default User-Agent, no timeout, and no delay.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    pub fn builder() -> PoliteClientBuilder {
        PoliteClientBuilder::default()
    }

    /// Perform a GET request. Sleeps until the configured delay has passed since the last request.
    pub fn get(&mut self, url: &Url) -> Result<reqwest::blocking::Response, reqwest::Error> {
        self.wait_delay();
        let response = self.inner.get(url.clone()).send();
        self.last_request = Some(Instant::now());
        response
    }

    fn wait_delay(&self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                std::thread::sleep(self.delay - elapsed);
            }
        }
    }
}

impl PageFetcher for PoliteClient {
    fn fetch(&mut self, url: &Url) -> Result<String, ScraperError> {
        debug!(%url, "fetching page");
        let response = self.get(url).map_err(|e| ScraperError::Network {
            url: url.to_string(),
            source: e,
        })?;
        check_response(response, url)
    }
}

/// Check response status and read body as text.
fn check_response(
    response: reqwest::blocking::Response,
    url: &Url,
) -> Result<String, ScraperError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    response.text().map_err(|e| ScraperError::BodyRead {
        url: url.to_string(),
        source: e,
    })
}

/// Builder for PoliteClient with optional User-Agent, delay, and timeout.
#[derive(Debug, Default)]
pub struct PoliteClientBuilder {
    user_agent: Option<String>,
    delay_secs: u64,
    timeout_secs: Option<u64>,
}

impl PoliteClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set delay between requests in seconds. Default 0.
    pub fn delay_secs(mut self, secs: u64) -> Self {
        self.delay_secs = secs;
        self
    }

    /// Set request timeout in seconds. Default: wait indefinitely.
    pub fn timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<PoliteClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        // reqwest's blocking client defaults to a 30s timeout; None disables it.
        let timeout = self.timeout_secs.map(Duration::from_secs);
        let inner = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(PoliteClient {
            inner,
            delay: Duration::from_secs(self.delay_secs),
            last_request: None,
        })
    }
}
