//! Core API rate limit handling.

use octocrab::Octocrab;
use std::time::Duration;
use tracing::{info, warn};

/// Longest we are willing to sleep for a rate limit reset.
const MAX_WAIT_SECS: u64 = 900;

/// Below this many remaining requests we wait for the reset.
const MIN_REMAINING_THRESHOLD: u32 = 10;

/// Snapshot of the core rate limit.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// Unix timestamp when the window resets.
    pub reset: u64,
}

impl RateLimitInfo {
    /// How long to wait before the next request, if at all.
    #[must_use]
    pub fn wait_duration(&self, now_secs: u64) -> Option<Duration> {
        if self.remaining >= MIN_REMAINING_THRESHOLD || self.reset <= now_secs {
            return None;
        }

        let wait_secs = self.reset - now_secs;
        if wait_secs > MAX_WAIT_SECS {
            warn!(
                wait_secs,
                max_wait = MAX_WAIT_SECS,
                "Rate limit reset too far in future, capping wait time"
            );
        }
        Some(Duration::from_secs(wait_secs.min(MAX_WAIT_SECS)))
    }
}

/// Fetches the current core rate limit.
///
/// # Errors
///
/// Returns an error if the rate limit endpoint cannot be queried.
pub async fn check_core_rate_limit(octocrab: &Octocrab) -> octocrab::Result<RateLimitInfo> {
    let rate_limit = octocrab.ratelimit().get().await?;
    Ok(RateLimitInfo {
        remaining: rate_limit.resources.core.remaining as u32,
        reset: rate_limit.resources.core.reset,
    })
}

/// Sleeps until the window resets when `info` shows too little headroom.
pub async fn wait_if_needed(info: &RateLimitInfo) {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if let Some(wait) = info.wait_duration(now) {
        info!(
            remaining = info.remaining,
            wait_secs = wait.as_secs(),
            "Rate limit low, waiting for reset"
        );
        tokio::time::sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_wait_with_headroom() {
        let info = RateLimitInfo {
            remaining: 4000,
            reset: 2_000,
        };
        assert_eq!(info.wait_duration(1_000), None);
    }

    #[test]
    fn no_wait_after_reset() {
        let info = RateLimitInfo {
            remaining: 1,
            reset: 500,
        };
        assert_eq!(info.wait_duration(1_000), None);
    }

    #[test]
    fn waits_until_reset_capped() {
        let near = RateLimitInfo {
            remaining: 2,
            reset: 1_030,
        };
        assert_eq!(near.wait_duration(1_000), Some(Duration::from_secs(30)));

        let far = RateLimitInfo {
            remaining: 0,
            reset: 100_000,
        };
        assert_eq!(
            far.wait_duration(1_000),
            Some(Duration::from_secs(MAX_WAIT_SECS))
        );
    }
}
