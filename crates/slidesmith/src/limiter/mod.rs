//! Request Rate Limiting
//!
//! Google caps Slides write requests per user per minute. Every edit in a
//! `batchUpdate` counts, so callers admit the size of each batch before
//! sending it.

pub mod batch;

pub use batch::partition;

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Admission control for outgoing requests.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until `n` requests may be issued, then record them.
    async fn admit(&self, n: usize);
}

/// Fixed-window limiter.
///
/// Admits a batch when `count + n < limit`. Otherwise it sleeps a full
/// window, zeroes the counter and tries again. Requests that happen to be
/// issued elsewhere during the wait are not accounted for.
pub struct FixedWindowLimiter {
    limit: usize,
    window: Duration,
    count: Mutex<usize>,
}

impl FixedWindowLimiter {
    pub const DEFAULT_LIMIT: usize = 60;
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            count: Mutex::new(0),
        }
    }

    /// Requests recorded in the current window.
    pub async fn count(&self) -> usize {
        *self.count.lock().await
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    // A batch that can never satisfy the strict bound still goes through on
    // a fresh window.
    fn fits(&self, count: usize, n: usize) -> bool {
        count + n < self.limit || (count == 0 && n >= self.limit)
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, Self::DEFAULT_WINDOW)
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn admit(&self, n: usize) {
        let mut count = self.count.lock().await;
        while !self.fits(*count, n) {
            warn!(
                "Exceeded {} requests per window ({} used, {} incoming), waiting {:?}",
                self.limit, *count, n, self.window
            );
            tokio::time::sleep(self.window).await;
            *count = 0;
        }
        *count += n;
        debug!("Admitted {} requests ({}/{} in window)", n, *count, self.limit);
    }
}
