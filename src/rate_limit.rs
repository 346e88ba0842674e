use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Tracked usernames above which stale entries are swept on the next failure.
const SWEEP_THRESHOLD: usize = 10_000;

/// Per-username login brute force limiter.
pub struct LoginRateLimiter {
    /// username -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_failures: u32,
    window: Duration,
    sweep_threshold: usize,
}

impl LoginRateLimiter {
    /// 5 failures per 15 minutes.
    pub fn new() -> Self {
        Self::with_limits(5, Duration::from_secs(15 * 60))
    }

    pub fn with_limits(max_failures: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_failures,
            window,
            sweep_threshold: SWEEP_THRESHOLD,
        }
    }

    /// Returns the seconds until the lockout lifts when the username is locked.
    /// Does not count the attempt; call `record_failure()` on a wrong password.
    pub fn check(&self, username: &str) -> Result<(), u64> {
        let now = Instant::now();

        let Some(entry) = self.entries.get(&username.to_lowercase()) else {
            return Ok(());
        };

        let (count, start) = entry.value();
        let elapsed = now.duration_since(*start);

        if elapsed > self.window || *count < self.max_failures {
            return Ok(());
        }

        Err(self.window.saturating_sub(elapsed).as_secs())
    }

    pub fn record_failure(&self, username: &str) {
        if self.entries.len() > self.sweep_threshold {
            self.cleanup(self.window);
        }

        let now = Instant::now();

        let mut entry = self
            .entries
            .entry(username.to_lowercase())
            .or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Forget past failures after a successful login.
    pub fn reset(&self, username: &str) {
        self.entries.remove(&username.to_lowercase());
    }

    /// Drop entries whose window started more than `max_age` ago.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locks_after_max_failures() {
        let limiter = LoginRateLimiter::with_limits(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check("Alice").is_ok());
            limiter.record_failure("Alice");
        }
        let retry = limiter.check("alice").unwrap_err();
        assert!(retry <= 60);
        assert!(limiter.check("bob").is_ok());
    }

    #[test]
    fn reset_clears_failures() {
        let limiter = LoginRateLimiter::with_limits(1, Duration::from_secs(60));
        limiter.record_failure("alice");
        assert!(limiter.check("alice").is_err());
        limiter.reset("alice");
        assert!(limiter.check("alice").is_ok());
    }

    #[test]
    fn window_expiry_unlocks() {
        let limiter = LoginRateLimiter::with_limits(1, Duration::from_millis(10));
        limiter.record_failure("alice");
        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check("alice").is_ok());
    }

    #[test]
    fn cleanup_drops_stale_entries() {
        let limiter = LoginRateLimiter::with_limits(5, Duration::from_secs(60));
        limiter.record_failure("old");
        std::thread::sleep(Duration::from_millis(100));
        limiter.record_failure("fresh");

        limiter.cleanup(Duration::from_millis(50));
        assert_eq!(limiter.entries.len(), 1);
        limiter.record_failure("fresh");
        assert_eq!(limiter.entries.get("fresh").unwrap().0, 2);
    }

    #[test]
    fn failures_for_many_usernames_are_swept() {
        let limiter = LoginRateLimiter {
            sweep_threshold: 3,
            ..LoginRateLimiter::with_limits(5, Duration::from_millis(10))
        };
        for i in 0..4 {
            limiter.record_failure(&format!("random-{i}"));
        }
        std::thread::sleep(Duration::from_millis(30));

        limiter.record_failure("latest");
        assert_eq!(limiter.entries.len(), 1);
        assert!(limiter.entries.contains_key("latest"));
    }
}
