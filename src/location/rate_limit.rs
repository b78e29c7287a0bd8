//! Minimum-interval throttle for outbound geocoding calls.

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// Per-resolver throttle state.
#[derive(Debug, Default)]
struct ResolverState {
    last_request_at: Option<Instant>,
}

/// Spaces outbound calls at least `min_interval` apart.
///
/// The state lock is held across the sleep, so concurrent callers queue
/// up behind each other instead of each computing the same deficit.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    state: Mutex<ResolverState>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            state: Mutex::new(ResolverState::default()),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until `min_interval` has passed since the previous `wait`
    /// returned, then record now as the latest request time.
    pub fn wait(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = state.last_request_at {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let deficit = self.min_interval - elapsed;
                log::debug!("Rate limit: sleeping {:?}", deficit);
                thread::sleep(deficit);
            }
        }
        state.last_request_at = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_zero_interval_never_sleeps() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        for _ in 0..100 {
            limiter.wait();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_first_call_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.wait();
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_sequential_calls_spaced() {
        let interval = Duration::from_millis(80);
        let limiter = RateLimiter::new(interval);
        limiter.wait();
        let start = Instant::now();
        limiter.wait();
        limiter.wait();
        assert!(start.elapsed() >= interval * 2);
    }

    #[test]
    fn test_concurrent_calls_spaced() {
        let interval = Duration::from_millis(40);
        let limiter = Arc::new(RateLimiter::new(interval));
        let start = Instant::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                thread::spawn(move || limiter.wait())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // Four waits, the first free: three full intervals at minimum.
        assert!(start.elapsed() >= interval * 3);
    }
}
