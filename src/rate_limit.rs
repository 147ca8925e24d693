use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Per-email brute force limiter for `/api/auth/login`.
pub struct LoginRateLimiter {
    /// email -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_failures: u32,
    window: Duration,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }
}

impl LoginRateLimiter {
    pub fn new(max_failures: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_failures,
            window,
        }
    }

    /// Returns the seconds until the next attempt is allowed when blocked.
    /// Does not count the attempt; call `record_failure()` on a bad password.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let now = Instant::now();

        let Some(entry) = self.entries.get(&email.to_lowercase()) else {
            return Ok(());
        };
        let (count, start) = *entry.value();

        let elapsed = now.duration_since(start);
        if elapsed > self.window || count < self.max_failures {
            return Ok(());
        }

        Err(self.window.saturating_sub(elapsed).as_secs().max(1))
    }

    pub fn record_failure(&self, email: &str) {
        let now = Instant::now();

        let mut entry = self.entries.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Forget failures after a successful login.
    pub fn record_success(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    /// Drop windows that have already expired.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let window = self.window;
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) <= window);
    }

    pub fn tracked(&self) -> usize {
        self.entries.len()
    }
}
