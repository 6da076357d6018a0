//! HTTP seam for the adapter, plus the blocking reqwest client used in production.
//!
//! The extraction code only needs "GET a URL, give me status and body", so it talks to
//! [`HttpClient`]. [`PoliteClient`] is the real implementation: delay between requests,
//! bounded retries for transient failures, cookie jar, and a browser-like User-Agent.

use crate::scraper::error::ScraperError;
use std::time::{Duration, Instant};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; meioscrape/0.1; +https://github.com/meioscrape)";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DELAY_SECS: u64 = 1;
const MAX_REDIRECTS: usize = 10;

/// Default number of attempts per GET (initial plus retries).
const DEFAULT_RETRY_COUNT: u32 = 3;
/// Default backoff delays in seconds after each failed attempt.
const DEFAULT_BACKOFF_SECS: [u64; 2] = [1, 2];
/// Backoff for HTTP 429 (rate limit): wait longer so the server can recover.
const BACKOFF_429_SECS: [u64; 4] = [30, 60, 90, 120];

/// Status and body of a completed GET. Non-2xx statuses are still a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a 2xx response; any other status becomes [`ScraperError::HttpStatus`].
    pub fn into_body(self, url: &str, context: Option<&str>) -> Result<String, ScraperError> {
        if !self.is_success() {
            return Err(ScraperError::HttpStatus {
                status: self.status,
                url: url.to_string(),
                context: context.map(String::from),
            });
        }
        Ok(self.body)
    }
}

/// Minimal HTTP capability the extraction pipeline depends on.
///
/// `Err` means the transport failed (no status obtained). Operations borrow the client
/// mutably, so concurrent operations each need their own client.
pub trait HttpClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, ScraperError>;
}

/// Blocking HTTP client that enforces a delay between requests.
#[derive(Debug)]
pub struct PoliteClient {
    inner: reqwest::blocking::Client,
    delay: Duration,
    last_request: Option<Instant>,
    retry_count: u32,
    backoff_secs: Vec<u64>,
}

impl PoliteClient {
    /// Build a polite client with default User-Agent, timeout, and delay.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    /// Builder for custom User-Agent, delay, timeout and retry settings.
    pub fn builder() -> PoliteClientBuilder {
        PoliteClientBuilder::default()
    }

    /// Send a GET, retrying timeouts, connection errors, HTTP 5xx and HTTP 429.
    ///
    /// The final attempt's response is returned whatever its status; callers decide what
    /// a non-2xx means for them.
    fn send_with_retry(
        &mut self,
        url: &str,
    ) -> Result<reqwest::blocking::Response, reqwest::Error> {
        let mut attempt: u32 = 0;
        loop {
            self.wait_delay();
            let result = self.inner.get(url).send();
            self.last_request = Some(Instant::now());
            let last_attempt = attempt + 1 >= self.retry_count;
            let backoff = match result {
                Ok(response) => {
                    let status = response.status();
                    let retryable = status.is_server_error() || status.as_u16() == 429;
                    if !retryable || last_attempt {
                        return Ok(response);
                    }
                    if status.as_u16() == 429 {
                        backoff_at(&BACKOFF_429_SECS, attempt, 60)
                    } else {
                        backoff_at(&self.backoff_secs, attempt, 1)
                    }
                }
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect();
                    if !retryable || last_attempt {
                        return Err(e);
                    }
                    backoff_at(&self.backoff_secs, attempt, 1)
                }
            };
            tracing::debug!(url, attempt, backoff_secs = backoff, "transient failure, retrying");
            std::thread::sleep(Duration::from_secs(backoff));
            attempt += 1;
        }
    }

    fn wait_delay(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                std::thread::sleep(self.delay - elapsed);
            }
        }
    }
}

/// Backoff for `attempt`, reusing the last entry past the end of the table.
fn backoff_at(table: &[u64], attempt: u32, default: u64) -> u64 {
    table
        .get(attempt as usize)
        .or_else(|| table.last())
        .copied()
        .unwrap_or(default)
}

impl HttpClient for PoliteClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, ScraperError> {
        tracing::debug!(url, "GET");
        let response = self
            .send_with_retry(url)
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: Box::new(e),
            })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| ScraperError::BodyRead {
            url: url.to_string(),
            source: Box::new(e),
        })?;
        Ok(HttpResponse { status, body })
    }
}

/// Builder for PoliteClient with optional User-Agent, delay, timeout, and retry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoliteClientBuilder {
    user_agent: Option<String>,
    delay_secs: u64,
    timeout_secs: u64,
    retry_count: u32,
    retry_backoff_secs: Vec<u64>,
}

impl Default for PoliteClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            delay_secs: DEFAULT_DELAY_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_backoff_secs: DEFAULT_BACKOFF_SECS.to_vec(),
        }
    }
}

impl PoliteClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set delay between requests in seconds. Default 1.
    pub fn delay_secs(mut self, secs: u64) -> Self {
        self.delay_secs = secs;
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set number of HTTP attempts for transient failures (default 3, minimum 1).
    pub fn retry_count(mut self, n: u32) -> Self {
        self.retry_count = n.max(1);
        self
    }

    /// Set backoff delays in seconds before each retry. If shorter than needed, the last value is reused.
    pub fn retry_backoff_secs(mut self, secs: Vec<u64>) -> Self {
        self.retry_backoff_secs = secs;
        self
    }

    /// Build the blocking client and polite wrapper.
    pub fn build(self) -> Result<PoliteClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        let backoff_secs = if self.retry_backoff_secs.is_empty() {
            // Exponential 1, 2, 4, ... for (retry_count - 1) steps
            let n = self.retry_count.saturating_sub(1) as usize;
            (0..n).map(|i| 1u64 << i.min(4)).collect::<Vec<_>>()
        } else {
            self.retry_backoff_secs
        };
        Ok(PoliteClient {
            inner,
            delay: Duration::from_secs(self.delay_secs),
            last_request: None,
            retry_count: self.retry_count,
            backoff_secs,
        })
    }
}
