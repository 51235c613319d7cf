use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ThrottleError {
    #[error("rate: wait for 1 token exceeds limiter's burst {0}")]
    BurstExceeded(u32),

    #[error("rate: wait for 1 token would exceed the {0:?} deadline")]
    DeadlineExceeded(Duration),
}

/// Admission control applied to every decoded request before dispatch.
#[async_trait::async_trait]
pub trait RateLimiter: Send + Sync {
    /// Waits for one token. Gives up with a [`ThrottleError`] if the token
    /// cannot be had within `timeout`.
    async fn acquire(&self, timeout: Duration) -> Result<(), ThrottleError>;
}

/// Admits everything. Used when no limiter is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

#[async_trait::async_trait]
impl RateLimiter for Unlimited {
    async fn acquire(&self, _timeout: Duration) -> Result<(), ThrottleError> {
        Ok(())
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last: Instant,
}

/// Token bucket refilled at `rate` tokens per second up to `burst` tokens.
///
/// A token that becomes available within the timeout is reserved at once
/// and the caller sleeps until it is due, so concurrent waiters queue in
/// arrival order. A token that would arrive after the timeout is not
/// reserved and the call fails immediately.
#[derive(Debug)]
pub struct TokenBucket {
    rate: f64,
    burst: u32,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Starts with a full bucket.
    pub fn new(rate: f64, burst: u32) -> Self {
        Self {
            rate: rate.max(0.0),
            burst,
            state: Mutex::new(BucketState {
                tokens: burst as f64,
                last: Instant::now(),
            }),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }

    // Reserves one token and returns how long until it is due.
    fn reserve(&self, timeout: Duration) -> Result<Duration, ThrottleError> {
        if self.burst == 0 {
            return Err(ThrottleError::BurstExceeded(self.burst));
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let now = Instant::now();
        let elapsed = now.saturating_duration_since(state.last).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rate).min(self.burst as f64);
        state.last = now;

        let remaining = state.tokens - 1.0;
        let wait = if remaining >= 0.0 {
            Duration::ZERO
        } else if self.rate > 0.0 {
            // Very small rates push the wait past what a Duration holds.
            Duration::try_from_secs_f64(-remaining / self.rate)
                .map_err(|_| ThrottleError::DeadlineExceeded(timeout))?
        } else {
            return Err(ThrottleError::DeadlineExceeded(timeout));
        };

        if wait > timeout {
            return Err(ThrottleError::DeadlineExceeded(timeout));
        }

        state.tokens = remaining;
        Ok(wait)
    }
}

#[async_trait::async_trait]
impl RateLimiter for TokenBucket {
    async fn acquire(&self, timeout: Duration) -> Result<(), ThrottleError> {
        let wait = self.reserve(timeout)?;

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        Ok(())
    }
}
