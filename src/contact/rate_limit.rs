//! Per-client request counting over a fixed window

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::ContactConfig;

/// Result of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Counts requests per key.
///
/// Call sites only see this trait so the in-memory counter can be replaced
/// by a shared store.
pub trait RateLimiter: Send + Sync {
    /// Count a request from `key` and decide whether it may proceed
    fn check(&self, key: &str) -> RateDecision;
}

#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    count: u32,
    reset_at: Instant,
}

/// Process-local limiter. A key's window starts on its first request and is
/// reset lazily by the first request after it expires.
#[derive(Debug)]
pub struct InMemoryRateLimiter {
    window: Duration,
    max_requests: u32,
    records: Mutex<HashMap<String, WindowRecord>>,
}

/// Expired records are swept once the map grows past this size
const PRUNE_THRESHOLD: usize = 10_000;

impl InMemoryRateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &ContactConfig) -> Self {
        Self::new(Duration::from_secs(config.window_secs), config.max_requests)
    }

    /// `check` with an explicit clock
    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());

        if records.len() > PRUNE_THRESHOLD {
            records.retain(|_, r| now <= r.reset_at);
        }

        let fresh = WindowRecord {
            count: 0,
            reset_at: now + self.window,
        };
        let record = records.entry(key.to_string()).or_insert(fresh);
        if now > record.reset_at {
            *record = fresh;
        }

        if record.count >= self.max_requests {
            return RateDecision::Limited {
                retry_after: record.reset_at - now,
            };
        }
        record.count += 1;
        RateDecision::Allowed {
            remaining: self.max_requests - record.count,
        }
    }

    /// Number of keys currently tracked
    pub fn tracked(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }
}
