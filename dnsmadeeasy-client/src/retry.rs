//! Decorrelated-jitter backoff for rate-limited requests.
//!
//! Delays follow the "decorrelated jitter v2" curve: for step `t` the
//! median delay sits near `median_first_retry_delay * 2^t`, while the random
//! component keeps concurrent clients from retrying in lockstep.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ClientError, Result};

/// Upper bound for the retry count.
pub const MAX_RETRY_COUNT: u32 = 255;

/// Tunes how quickly the curve flattens.
const P_FACTOR: f64 = 4.0;

/// Factor that makes the median of the first retry land on the configured delay.
const RP_SCALING_FACTOR: f64 = 1.0 / 1.4;

/// Retry schedule parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorrelatedJitter {
    median_first_retry_delay: Duration,
    retry_count: u32,
}

impl DecorrelatedJitter {
    pub fn new(median_first_retry_delay: Duration, retry_count: u32) -> Result<Self> {
        if retry_count > MAX_RETRY_COUNT {
            return Err(ClientError::invalid_argument(
                "retry_count",
                format!("must be at most {MAX_RETRY_COUNT}, got {retry_count}"),
            ));
        }
        Ok(Self {
            median_first_retry_delay,
            retry_count,
        })
    }

    /// A schedule with a single, immediate attempt.
    pub const fn disabled() -> Self {
        Self {
            median_first_retry_delay: Duration::ZERO,
            retry_count: 0,
        }
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Starts a fresh delay sequence with its own generator.
    pub fn delays(&self) -> Delays<StdRng> {
        self.delays_with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    pub fn delays_with_rng<R: Rng>(&self, rng: R) -> Delays<R> {
        Delays {
            scaling_secs: self.median_first_retry_delay.as_secs_f64() * RP_SCALING_FACTOR,
            attempt: 0,
            last_attempt: self.retry_count,
            intrinsic: 0.0,
            rng,
        }
    }
}

impl Default for DecorrelatedJitter {
    fn default() -> Self {
        Self {
            median_first_retry_delay: Duration::from_secs(10),
            retry_count: 5,
        }
    }
}

/// `retry_count + 1` delays; the first one is always zero.
#[derive(Debug, Clone)]
pub struct Delays<R> {
    scaling_secs: f64,
    attempt: u32,
    last_attempt: u32,
    intrinsic: f64,
    rng: R,
}

impl<R: Rng> Iterator for Delays<R> {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.attempt > self.last_attempt {
            return None;
        }

        let secs = (self.intrinsic * self.scaling_secs).max(0.0);
        let delay = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);

        let t = f64::from(self.attempt) + self.rng.random::<f64>();
        self.intrinsic = t.exp2() * (P_FACTOR * t).sqrt().tanh() - self.intrinsic;
        self.attempt += 1;

        Some(delay)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.last_attempt + 1).saturating_sub(self.attempt) as usize;
        (remaining, Some(remaining))
    }
}

impl<R: Rng> ExactSizeIterator for Delays<R> {}
