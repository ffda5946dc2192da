//! Request pacing
//!
//! The remote host has no published rate limits, so every request is
//! followed by a randomized pause.

use crate::config::CrawlerConfig;
use rand::Rng;
use std::time::Duration;

/// Enforces a randomized minimum delay between outbound requests
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_delay: Duration,
    max_delay: Duration,
    bypass: bool,
}

impl RateLimiter {
    /// Creates a limiter pausing for a duration drawn uniformly from
    /// `[min_delay, max_delay)`
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay,
            bypass: false,
        }
    }

    /// Creates a limiter whose `wait` is a no-op
    pub fn disabled() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            bypass: true,
        }
    }

    /// Builds the limiter for a run; `no_wait` bypasses all pauses
    pub fn from_config(config: &CrawlerConfig, no_wait: bool) -> Self {
        if no_wait {
            Self::disabled()
        } else {
            Self::new(
                Duration::from_millis(config.min_delay_ms),
                Duration::from_millis(config.max_delay_ms),
            )
        }
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Draws the next pause length
    pub fn next_delay(&self) -> Duration {
        if self.bypass {
            return Duration::ZERO;
        }
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rand::thread_rng().gen_range(self.min_delay..self.max_delay)
    }

    /// Pauses the calling task; never fails
    pub async fn wait(&self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        tracing::trace!("Waiting {:?} before the next request", delay);
        tokio::time::sleep(delay).await;
    }
}
