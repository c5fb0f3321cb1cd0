//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the shared HTTP client with a descriptive user agent
//! - Single GET attempts with redirect following
//! - Classifying failures as transient or permanent
//! - The retry loop with exponential backoff

use crate::config::{Config, CrawlerConfig};
use crate::state::FetchTracker;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::future::Future;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was retrieved
    Success {
        /// Response body, decoded to UTF-8 for HTTP responses
        body: Vec<u8>,
        /// Final URL after redirects
        final_url: String,
    },

    /// Worth retrying (timeout, connection reset, 5xx)
    TransientFailure {
        /// Error description
        reason: String,
    },

    /// Not worth retrying (4xx, malformed response, retries exhausted)
    PermanentFailure {
        /// Error description
        reason: String,
    },
}

impl FetchOutcome {
    pub fn success(body: impl Into<Vec<u8>>, final_url: impl Into<String>) -> Self {
        Self::Success {
            body: body.into(),
            final_url: final_url.into(),
        }
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        Self::TransientFailure {
            reason: reason.into(),
        }
    }

    pub fn permanent(reason: impl Into<String>) -> Self {
        Self::PermanentFailure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Transport seam used by the sitemap reader and the crawl coordinator
///
/// One call is exactly one attempt: implementations never retry. Retrying is
/// driven by [`fetch_with_retry`].
pub trait PageFetcher: Send + Sync + 'static {
    fn attempt(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

/// Builds the HTTP client shared by every request of a crawl
///
/// The user agent has the form `Name/Version (+ContactURL)`. Redirects are
/// followed up to `max-redirects`; the timeout applies to each request as a
/// whole (connect, headers and body).
///
/// # Example
///
/// ```no_run
/// use link_harvest::config::Config;
/// use link_harvest::crawler::build_http_client;
///
/// let config = Config::for_sitemap("https://blog.example/sitemap.xml");
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.user_agent.user_agent_string())
        .default_headers(headers)
        .timeout(config.crawler.request_timeout())
        .connect_timeout(config.crawler.request_timeout())
        .redirect(Policy::limited(config.crawler.max_redirects as usize))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::from_client(build_http_client(config)?))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    /// Performs one GET request
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | 2xx | Success |
    /// | HTTP 5xx | Transient |
    /// | Timeout, connection error, broken body | Transient |
    /// | HTTP 4xx | Permanent |
    /// | Too many redirects, undecodable body, other status | Permanent |
    async fn attempt(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        let status = response.status();
        let final_url = response.url().to_string();

        if let Some(failure) = classify_status(status) {
            return failure;
        }

        // Decoded with the Content-Type charset so the body handed on is always UTF-8
        match response.text_with_charset("utf-8").await {
            Ok(body) => FetchOutcome::Success {
                body: body.into_bytes(),
                final_url,
            },
            Err(e) => classify_error(&e),
        }
    }
}

/// Maps a non-success status to a failure outcome
///
/// Returns `None` for 2xx statuses.
pub fn classify_status(status: StatusCode) -> Option<FetchOutcome> {
    if status.is_success() {
        None
    } else if status.is_server_error() {
        Some(FetchOutcome::transient(format!("HTTP {}", status.as_u16())))
    } else if status.is_client_error() {
        Some(FetchOutcome::permanent(format!("HTTP {}", status.as_u16())))
    } else {
        Some(FetchOutcome::permanent(format!(
            "Unexpected HTTP status {}",
            status.as_u16()
        )))
    }
}

/// Classifies a transport error
fn classify_error(e: &reqwest::Error) -> FetchOutcome {
    if e.is_redirect() {
        FetchOutcome::permanent(format!("Redirect error: {}", e))
    } else if e.is_builder() {
        FetchOutcome::permanent(format!("Invalid request: {}", e))
    } else if e.is_decode() {
        FetchOutcome::permanent(format!("Malformed response: {}", e))
    } else if e.is_timeout() {
        FetchOutcome::transient("Request timeout")
    } else if e.is_connect() {
        FetchOutcome::transient(format!("Connection error: {}", e))
    } else if e.is_request() || e.is_body() {
        FetchOutcome::transient(format!("Network error: {}", e))
    } else {
        FetchOutcome::permanent(e.to_string())
    }
}

/// Retry budget and backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Backoff before the first retry; doubled for each further retry
    pub base_backoff: Duration,
    /// Ceiling for a single backoff
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_backoff: config.retry_backoff(),
            max_backoff: config.max_backoff(),
        }
    }

    /// Backoff before retry number `retry` (1-based): `base * 2^(retry - 1)`, capped
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

/// Final result of a fetch including retries
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// `Success` or `PermanentFailure`; transient failures never escape the retry loop
    pub outcome: FetchOutcome,
    /// Attempts made, including the first
    pub attempts: u32,
}

/// Fetches a URL, retrying transient failures per the policy
///
/// Exhausted retries are demoted to `PermanentFailure` carrying the last reason.
pub async fn fetch_with_retry<F: PageFetcher>(
    fetcher: &F,
    url: &str,
    policy: &RetryPolicy,
) -> FetchReport {
    let mut tracker = FetchTracker::new(policy.max_retries);
    let max_attempts = policy.max_retries.saturating_add(1);

    loop {
        let attempt = match tracker.begin_attempt() {
            Ok(n) => n,
            Err(e) => {
                return FetchReport {
                    outcome: FetchOutcome::permanent(e.to_string()),
                    attempts: tracker.attempts(),
                }
            }
        };

        tracing::debug!("Attempt {}/{} for {}", attempt, max_attempts, url);
        let outcome = fetcher.attempt(url).await;

        let step = match &outcome {
            FetchOutcome::Success { .. } => tracker.succeed().map(|_| false),
            FetchOutcome::PermanentFailure { .. } => tracker.fail().map(|_| false),
            FetchOutcome::TransientFailure { reason } => {
                tracing::debug!("Transient failure for {} (attempt {}): {}", url, attempt, reason);
                tracker.transient_failure()
            }
        };

        match step {
            Ok(true) => {
                let backoff = policy.backoff_for(attempt);
                tracing::trace!("Backing off {:?} before retrying {}", backoff, url);
                tokio::time::sleep(backoff).await;
            }
            Ok(false) => {
                let outcome = match outcome {
                    FetchOutcome::TransientFailure { reason } => FetchOutcome::permanent(format!(
                        "retries exhausted after {} attempts: {}",
                        attempt, reason
                    )),
                    other => other,
                };
                return FetchReport {
                    outcome,
                    attempts: tracker.attempts(),
                };
            }
            Err(e) => {
                return FetchReport {
                    outcome: FetchOutcome::permanent(e.to_string()),
                    attempts: tracker.attempts(),
                }
            }
        }
    }
}
