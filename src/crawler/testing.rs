//! In-memory fetcher for unit tests
//!
//! Serves scripted responses and records how many attempts were in flight at
//! the same time.

use crate::crawler::fetcher::{FetchOutcome, PageFetcher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Script {
    transient_failures: u32,
    panics: bool,
    response: FetchOutcome,
    latency: Duration,
}

/// Scripted [`PageFetcher`]; unknown URLs answer with a permanent `HTTP 404`
#[derive(Debug, Default)]
pub(crate) struct ScriptedFetcher {
    scripts: HashMap<String, Script>,
    attempts: Mutex<HashMap<String, u32>>,
    total_attempts: AtomicU32,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn script(mut self, url: &str, transient_failures: u32, response: FetchOutcome, latency: Duration) -> Self {
        self.scripts.insert(
            url.to_string(),
            Script {
                transient_failures,
                panics: false,
                response,
                latency,
            },
        );
        self
    }

    /// Serves `body` immediately
    pub(crate) fn page(self, url: &str, body: &str) -> Self {
        self.slow_page(url, Duration::ZERO, body)
    }

    /// Serves `body` after `latency`
    pub(crate) fn slow_page(self, url: &str, latency: Duration, body: &str) -> Self {
        let response = FetchOutcome::success(body.as_bytes().to_vec(), url);
        self.script(url, 0, response, latency)
    }

    /// Fails transiently `failures` times, then serves `body`
    pub(crate) fn flaky_page(self, url: &str, failures: u32, body: &str) -> Self {
        let response = FetchOutcome::success(body.as_bytes().to_vec(), url);
        self.script(url, failures, response, Duration::ZERO)
    }

    /// Serves `body` as if fetched from `final_url` after a redirect
    pub(crate) fn redirected_page(self, url: &str, final_url: &str, body: &str) -> Self {
        let response = FetchOutcome::success(body.as_bytes().to_vec(), final_url);
        self.script(url, 0, response, Duration::ZERO)
    }

    /// Panics inside the fetch
    pub(crate) fn panicking_page(mut self, url: &str) -> Self {
        self = self.script(url, 0, FetchOutcome::permanent("unreachable"), Duration::ZERO);
        if let Some(script) = self.scripts.get_mut(url) {
            script.panics = true;
        }
        self
    }

    /// Always fails permanently with `reason`
    pub(crate) fn failing_page(self, url: &str, reason: &str) -> Self {
        self.script(url, 0, FetchOutcome::permanent(reason), Duration::ZERO)
    }

    pub(crate) fn attempts_for(&self, url: &str) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn total_attempts(&self) -> u32 {
        self.total_attempts.load(Ordering::SeqCst)
    }

    /// Highest number of attempts observed in flight at once
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn attempt(&self, url: &str) -> FetchOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.total_attempts.fetch_add(1, Ordering::SeqCst);

        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(url.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let outcome = match self.scripts.get(url) {
            Some(script) => {
                // Yield even for instant responses so overlapping attempts can be observed
                tokio::time::sleep(script.latency).await;
                if script.panics {
                    panic!("fetch of {} blew up", url);
                }
                if attempt <= script.transient_failures {
                    FetchOutcome::transient("HTTP 503")
                } else {
                    script.response.clone()
                }
            }
            None => FetchOutcome::permanent("HTTP 404"),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}
