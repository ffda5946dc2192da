//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with proper user agent strings
//! - Pausing through the rate limiter after every request
//! - Retry logic for transient failures
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::limiter::RateLimiter;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched the page
    Page {
        /// Final URL after redirects
        url: Url,
        /// Page body content
        body: String,
    },

    /// The server answered with a non-success status
    Status {
        /// HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, unreadable body)
    Network {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    /// Short description of a failed outcome, for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Page { url, .. } => format!("fetched {}", url),
            Self::Status { status_code } => format!("HTTP {}", status_code),
            Self::Network { error } => error.clone(),
        }
    }

    fn is_transient(&self) -> bool {
        match self {
            Self::Page { .. } => false,
            Self::Status { status_code } => {
                *status_code == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status_code >= 500
            }
            Self::Network { .. } => true,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use radar_harvest::config::{CrawlerConfig, UserAgentConfig};
/// use radar_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        agent.crawler_name, agent.crawler_version, agent.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited page fetcher shared by every stage of a run
pub struct Fetcher {
    client: Client,
    limiter: RateLimiter,
    max_retries: u32,
}

impl Fetcher {
    pub fn new(client: Client, limiter: RateLimiter, max_retries: u32) -> Self {
        Self {
            client,
            limiter,
            max_retries,
        }
    }

    /// Builds the client and limiter for a run
    pub fn from_config(
        agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
        no_wait: bool,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(agent, crawler)?;
        let limiter = RateLimiter::from_config(crawler, no_wait);
        Ok(Self::new(client, limiter, crawler.max_retries))
    }

    /// Fetches a page, pausing after every attempt
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Return the body |
    /// | HTTP 429, 5xx | Retry up to `max_retries` times |
    /// | Timeout, connection error | Retry up to `max_retries` times |
    /// | Other status | Return immediately |
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        let mut attempt = 0;
        loop {
            let outcome = self.fetch_once(url).await;
            self.limiter.wait().await;

            if !outcome.is_transient() || attempt >= self.max_retries {
                return outcome;
            }

            attempt += 1;
            tracing::debug!(
                "Retrying {} ({}), attempt {} of {}",
                url,
                outcome.describe(),
                attempt,
                self.max_retries
            );
        }
    }

    async fn fetch_once(&self, url: &Url) -> FetchOutcome {
        tracing::trace!("GET {}", url);

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    "Connection refused".to_string()
                } else {
                    e.to_string()
                };
                return FetchOutcome::Network { error };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Status {
                status_code: status.as_u16(),
            };
        }

        let final_url = response.url().clone();
        match response.text().await {
            Ok(body) => FetchOutcome::Page {
                url: final_url,
                body,
            },
            Err(e) => FetchOutcome::Network {
                error: e.to_string(),
            },
        }
    }
}
