//! Shared fetch-start rate limiter
//!
//! A single token bucket bounds how often fetches may start across every
//! worker of a run. Tokens accumulate continuously at the sustained rate up to
//! the burst capacity; `acquire` waits for a token and never rejects, except
//! when the run is cancelled while waiting.

use crate::config::RateSettings;
use crate::ConfigError;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

type DirectLimiter = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Errors returned by [`RateLimiter::acquire`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RateLimitError {
    #[error("rate limiter wait cancelled")]
    Cancelled,
}

/// Token bucket shared by all crawl workers of a run
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DirectLimiter>,
    requests_per_second: f64,
    burst: NonZeroU32,
}

impl RateLimiter {
    /// Creates a limiter with a sustained rate and a burst capacity
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the rate is not a finite positive
    /// number, or is too high or too low to be represented.
    pub fn new(requests_per_second: f64, burst: NonZeroU32) -> Result<Self, ConfigError> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "requests_per_second must be positive, got {}",
                requests_per_second
            )));
        }

        let period = Duration::try_from_secs_f64(1.0 / requests_per_second).map_err(|_| {
            ConfigError::Validation(format!(
                "requests_per_second {} is too low",
                requests_per_second
            ))
        })?;
        let quota = Quota::with_period(period)
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "requests_per_second {} is too high",
                    requests_per_second
                ))
            })?
            .allow_burst(burst);

        Ok(Self {
            limiter: Arc::new(governor::RateLimiter::direct(quota)),
            requests_per_second,
            burst,
        })
    }

    /// Creates a limiter from resolved settings
    pub fn from_settings(settings: &RateSettings) -> Result<Self, ConfigError> {
        Self::new(settings.requests_per_second, settings.burst)
    }

    /// Waits until a token is available and consumes it
    ///
    /// Callers queued at the same time are served in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitError::Cancelled` if `cancel` fires while waiting.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), RateLimitError> {
        if cancel.is_cancelled() {
            return Err(RateLimitError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RateLimitError::Cancelled),
            _ = self.limiter.until_ready() => Ok(()),
        }
    }

}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("requests_per_second", &self.requests_per_second)
            .field("burst", &self.burst)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_rejects_invalid_rate() {
        assert!(RateLimiter::new(0.0, nz(1)).is_err());
        assert!(RateLimiter::new(-1.0, nz(1)).is_err());
        assert!(RateLimiter::new(f64::INFINITY, nz(1)).is_err());
        assert!(RateLimiter::new(f64::NAN, nz(1)).is_err());
    }

    #[test]
    fn test_rejects_unrepresentable_period() {
        let err = RateLimiter::new(1e-300, nz(1)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("too low")));

        assert!(RateLimiter::new(f64::MIN_POSITIVE, nz(1)).is_err());
        assert!(RateLimiter::new(1e-6, nz(1)).is_ok());
    }

    #[tokio::test]
    async fn test_burst_is_immediate() {
        let limiter = RateLimiter::new(1.0, nz(3)).unwrap();
        let cancel = CancellationToken::new();

        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire(&cancel).await.unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_sustained_rate_bounds_concurrent_callers() {
        let limiter = RateLimiter::new(2.0, nz(1)).unwrap();
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let handles: Vec<_> = (0..5)
            .map(|_| {
                let limiter = limiter.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move { limiter.acquire(&cancel).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // First token is immediate, the other four arrive every 500ms
        assert!(start.elapsed() >= Duration::from_millis(1900));
    }

    #[tokio::test]
    async fn test_cancel_while_waiting() {
        let limiter = RateLimiter::new(0.1, nz(1)).unwrap();
        let cancel = CancellationToken::new();

        limiter.acquire(&cancel).await.unwrap();

        let waiter = {
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { limiter.acquire(&cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        assert_eq!(waiter.await.unwrap(), Err(RateLimitError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled() {
        let limiter = RateLimiter::new(10.0, nz(1)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(limiter.acquire(&cancel).await, Err(RateLimitError::Cancelled));
    }
}
