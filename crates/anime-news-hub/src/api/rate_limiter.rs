//! Request pacing for upstream catalogs.
//!
//! Enforces both a per-second spacing and a rolling per-minute budget.

use std::time::{Duration, Instant};
use tokio::time::sleep;

const WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter with dual constraints (per-second and per-minute)
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between two requests
    min_interval: Duration,
    /// Maximum requests per rolling minute
    max_per_minute: usize,
    /// Last request timestamp
    last_request: Option<Instant>,
    /// Request timestamps in the last minute, oldest first
    recent_requests: Vec<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(max_per_second: f64, max_per_minute: u32) -> Self {
        let min_interval = if max_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / max_per_second)
        } else {
            Duration::ZERO
        };

        Self {
            min_interval,
            max_per_minute: max_per_minute.max(1) as usize,
            last_request: None,
            recent_requests: Vec::with_capacity(max_per_minute as usize),
        }
    }

    /// How long a request issued at `now` has to wait
    pub fn delay_at(&mut self, now: Instant) -> Duration {
        self.recent_requests
            .retain(|&timestamp| now.duration_since(timestamp) < WINDOW);

        let mut wait = Duration::ZERO;

        if self.recent_requests.len() >= self.max_per_minute {
            if let Some(&oldest) = self.recent_requests.first() {
                wait = wait.max(WINDOW.saturating_sub(now.duration_since(oldest)));
            }
        }

        if let Some(last) = self.last_request {
            wait = wait.max(self.min_interval.saturating_sub(now.duration_since(last)));
        }

        wait
    }

    /// Record a request sent at `at`
    pub fn record(&mut self, at: Instant) {
        self.last_request = Some(at);
        self.recent_requests.push(at);
    }

    /// Wait until a request can be made, respecting both rate limits
    pub async fn acquire(&mut self) {
        let wait = self.delay_at(Instant::now());
        if !wait.is_zero() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate limit: waiting");
            sleep(wait).await;
        }
        self.record(Instant::now());
    }
}
