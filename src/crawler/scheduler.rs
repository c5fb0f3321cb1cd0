//! Rate limiting for page fetches
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - A randomized politeness delay before each fetch
//!
//! A slot is held from the start of the politeness delay until the caller drops
//! the returned [`Admission`], i.e. through the fetch and link extraction.

use crate::config::CrawlerConfig;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// An admitted fetch holding one concurrency slot
#[derive(Debug)]
pub struct Admission {
    /// The politeness delay that was waited out before admission returned
    pub delay: Duration,

    /// Released on drop
    _permit: OwnedSemaphorePermit,
}

/// Bounds simultaneous fetches and spaces them out with random delays
///
/// Slots are granted in request order (tokio's semaphore is fair), so tasks
/// dispatched first are admitted first.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// Total number of slots
    limit: usize,

    min_delay: Duration,
    max_delay: Duration,
}

impl RateLimiter {
    /// Creates a limiter with `limit` slots and a `[min_delay, max_delay]` jitter range
    ///
    /// A zero `limit` is raised to one, and an inverted range is reordered.
    pub fn new(limit: usize, min_delay: Duration, max_delay: Duration) -> Self {
        let limit = limit.max(1);
        let (min_delay, max_delay) = if min_delay <= max_delay {
            (min_delay, max_delay)
        } else {
            (max_delay, min_delay)
        };

        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            min_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        let (min_delay, max_delay) = config.delay_range();
        Self::new(config.concurrency_limit as usize, min_delay, max_delay)
    }

    /// Waits for a free slot, then waits out a random politeness delay
    ///
    /// The caller may fetch once this returns; dropping the [`Admission`]
    /// frees the slot.
    pub async fn admit(&self) -> Admission {
        let permit = match self.semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            // The semaphore is private to the limiter and never closed
            Err(_) => unreachable!("rate limiter semaphore closed"),
        };
        tracing::trace!(
            "Slot acquired ({} of {} in use)",
            self.in_flight(),
            self.limit
        );

        let delay = self.random_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        Admission {
            delay,
            _permit: permit,
        }
    }

    /// Draws a delay uniformly from the configured range
    pub fn random_delay(&self) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        let secs = rand::thread_rng()
            .gen_range(self.min_delay.as_secs_f64()..=self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of slots currently held
    pub fn in_flight(&self) -> usize {
        self.limit - self.semaphore.available_permits()
    }
}
